use std::sync::RwLock;

use reqwest::{
    cookie::{CookieStore, Jar},
    header::HeaderValue,
};
use url::Url;

/// Cookie store shared with the HTTP client.
///
/// Behaves like the browser's cookie jar for the session cookie, and can be
/// exported to a header string, imported from one, and reset on sign-out.
#[derive(Debug, Default)]
pub struct CookieVault {
    jar: RwLock<Jar>,
}

impl CookieVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cookies that would be sent to `url`, as a `name=value; ...` string.
    pub fn export(&self, url: &Url) -> Option<String> {
        self.cookies(url)
            .and_then(|value| value.to_str().ok().map(str::to_string))
            .filter(|header| !header.trim().is_empty())
    }

    /// Adds every `name=value` pair of a previously exported header.
    pub fn import(&self, header: &str, url: &Url) {
        let Ok(jar) = self.jar.read() else {
            return;
        };
        for entry in header.split(';') {
            let cookie = entry.trim();
            if !cookie.is_empty() {
                jar.add_cookie_str(cookie, url);
            }
        }
    }

    /// Drops every cookie.
    pub fn clear(&self) {
        if let Ok(mut jar) = self.jar.write() {
            *jar = Jar::default();
        }
    }
}

impl CookieStore for CookieVault {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        if let Ok(jar) = self.jar.read() {
            jar.set_cookies(cookie_headers, url);
        }
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        self.jar.read().ok()?.cookies(url)
    }
}
