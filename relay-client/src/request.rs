use std::{fmt, sync::Arc, time::Instant};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use reqwest::{
    Client, Method, StatusCode,
    header::{AUTHORIZATION, CONTENT_TYPE},
};
use serde::Serialize;
use url::Url;

use crate::{
    body::{RequestBody, ResponseBody},
    cookies::CookieVault,
    error::{ApiError, ApiResult},
    observer::{RequestEvent, RequestObserver, TracingObserver},
};

/// Username and password for the two bootstrap endpoints (login and
/// register), sent once as a Basic `Authorization` header.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// `Basic base64(username:password)`.
    pub fn authorization_header(&self) -> String {
        let encoded = STANDARD.encode(format!("{}:{}", self.username, self.password));
        format!("Basic {encoded}")
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A single call: method, path relative to the API base, optional query,
/// body, and (for bootstrap endpoints only) credentials.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    pub credentials: Option<Credentials>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
            credentials: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    #[must_use]
    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    /// Attaches `payload` as a JSON body.
    ///
    /// # Errors
    /// Returns [`ApiError`] if the payload cannot be serialized.
    pub fn with_json<T: Serialize + ?Sized>(self, payload: &T) -> ApiResult<Self> {
        Ok(self.with_body(RequestBody::json(payload)?))
    }

    #[must_use]
    pub fn with_text(self, content: impl Into<String>) -> Self {
        self.with_body(RequestBody::text(content))
    }

    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }
}

/// Builder for [`RequestClient`].
#[derive(Debug)]
pub struct RequestClientBuilder {
    base_url: Url,
    user_agent: Option<String>,
    cookies: Option<Arc<CookieVault>>,
    observer: Option<Arc<dyn RequestObserver>>,
}

impl RequestClientBuilder {
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    #[must_use]
    pub fn cookies(mut self, cookies: Arc<CookieVault>) -> Self {
        self.cookies = Some(cookies);
        self
    }

    #[must_use]
    pub fn observer(mut self, observer: Arc<dyn RequestObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    /// Returns [`ApiError`] if the underlying HTTP client cannot be built.
    pub fn build(self) -> ApiResult<RequestClient> {
        let cookies = self.cookies.unwrap_or_default();
        let http = Client::builder()
            .cookie_provider(Arc::clone(&cookies))
            .user_agent(
                self.user_agent
                    .unwrap_or_else(|| concat!("relay-client/", env!("CARGO_PKG_VERSION")).into()),
            )
            .build()
            .map_err(|err| ApiError::request_failed(format!("failed to build HTTP client: {err}")))?;

        Ok(RequestClient {
            base_url: with_trailing_slash(self.base_url),
            http,
            cookies,
            observer: self
                .observer
                .unwrap_or_else(|| Arc::new(TracingObserver)),
        })
    }
}

/// The single chokepoint for network I/O.
///
/// Every call carries the cookies in the shared [`CookieVault`]. Successful
/// responses are decoded by content type; failures are classified into an
/// [`ApiError`] and handed back untouched. Nothing is retried here.
#[derive(Clone, Debug)]
pub struct RequestClient {
    base_url: Url,
    http: Client,
    cookies: Arc<CookieVault>,
    observer: Arc<dyn RequestObserver>,
}

impl RequestClient {
    pub fn builder(base_url: Url) -> RequestClientBuilder {
        RequestClientBuilder {
            base_url,
            user_agent: None,
            cookies: None,
            observer: None,
        }
    }

    /// A client with default settings.
    ///
    /// # Errors
    /// Returns [`ApiError`] if the underlying HTTP client cannot be built.
    pub fn new(base_url: Url) -> ApiResult<Self> {
        Self::builder(base_url).build()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn cookies(&self) -> &Arc<CookieVault> {
        &self.cookies
    }

    /// The session cookies for this API, as a header string.
    pub fn export_cookies(&self) -> Option<String> {
        self.cookies.export(&self.base_url)
    }

    pub fn import_cookies(&self, header: &str) {
        self.cookies.import(header, &self.base_url);
    }

    pub fn clear_cookies(&self) {
        self.cookies.clear();
    }

    fn api_url(&self, path: &str, query: &[(String, String)]) -> ApiResult<Url> {
        let mut url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|err| ApiError::request_failed(format!("Invalid request path '{path}': {err}")))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Performs one call and reports it to the observer.
    ///
    /// # Errors
    /// Returns the classified [`ApiError`] for transport failures, non-2xx
    /// statuses, and bodies that do not decode as their declared type.
    pub async fn send(&self, request: ApiRequest) -> ApiResult<ResponseBody> {
        let started = Instant::now();
        let method = request.method.clone();
        let path = request.path.clone();

        let (status, result) = match self.api_url(&request.path, &request.query) {
            Ok(url) => self.execute(url, request).await,
            Err(err) => (None, Err(err)),
        };

        self.observer.on_request(&RequestEvent {
            method,
            path,
            status,
            failure: result.as_ref().err().map(ApiError::kind),
            elapsed: started.elapsed(),
        });

        result
    }

    async fn execute(
        &self,
        url: Url,
        request: ApiRequest,
    ) -> (Option<StatusCode>, ApiResult<ResponseBody>) {
        let mut builder = self.http.request(request.method, url);
        if let Some(credentials) = &request.credentials {
            builder = builder.header(AUTHORIZATION, credentials.authorization_header());
        }
        if let Some(content_type) = request.body.content_type() {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.body(value.to_string()),
            RequestBody::Text(text) => builder.body(text),
        };

        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) => return (None, Err(ApiError::from(err))),
        };

        let status = response.status();
        let content_type = response.headers().get(CONTENT_TYPE).cloned();
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(_) => return (Some(status), Err(ApiError::network_unavailable())),
        };

        if !status.is_success() {
            let text = String::from_utf8_lossy(&bytes);
            return (Some(status), Err(ApiError::from_status(status, &text)));
        }

        (
            Some(status),
            ResponseBody::decode(status, content_type.as_ref(), &bytes),
        )
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
