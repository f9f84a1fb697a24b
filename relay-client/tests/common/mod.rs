#![allow(dead_code)]

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use client::{AppContext, MemoryStore, RequestClient, SessionStore};
use serde_json::json;
use tokio::{net::TcpListener, sync::Notify};
use url::Url;

/// `alice:pass1234`
pub const ALICE_BASIC: &str = "Basic YWxpY2U6cGFzczEyMzQ=";
pub const ALICE_COOKIE: &str = "JSESSIONID=session-alice";

#[derive(Debug, Default)]
pub struct Recorded {
    pub login_calls: AtomicUsize,
    pub register_calls: AtomicUsize,
    pub logout_calls: AtomicUsize,
    pub comment_bodies: Mutex<Vec<(Option<String>, String)>>,
    /// While set, login waits for `login_release` before answering.
    pub hold_login: AtomicBool,
    pub login_release: Notify,
}

impl Recorded {
    pub fn logins(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }

    pub fn registrations(&self) -> usize {
        self.register_calls.load(Ordering::SeqCst)
    }

    pub fn logouts(&self) -> usize {
        self.logout_calls.load(Ordering::SeqCst)
    }
}

pub struct MockServer {
    pub base_url: Url,
    pub recorded: Arc<Recorded>,
}

impl MockServer {
    pub fn client(&self) -> RequestClient {
        RequestClient::new(self.base_url.clone()).unwrap()
    }

    pub fn context(&self, store: Arc<dyn SessionStore>) -> AppContext {
        AppContext::new(self.client(), store)
    }

    pub fn anonymous_context(&self) -> AppContext {
        self.context(Arc::new(MemoryStore::new()))
    }
}

/// Starts the fake Relay API on an ephemeral port.
pub async fn spawn() -> MockServer {
    let recorded = Arc::new(Recorded::default());
    let api = Router::new()
        .route("/users/login", post(login))
        .route("/users/register", post(register))
        .route("/users/logout", post(logout))
        .route("/users/me", get(me).put(update_me))
        .route("/users/search", get(search))
        .route("/users/{username}", get(profile))
        .route(
            "/users/{username}/follow",
            get(follow_status).post(follow).delete(follow),
        )
        .route("/users/{username}/followers", get(followers))
        .route("/users/{username}/following", get(following))
        .route("/posts", post(create_post))
        .route("/posts/timeline", get(timeline))
        .route("/posts/{id}", delete(delete_post))
        .route("/posts/{id}/like", post(like).delete(like))
        .route("/posts/{id}/comments", get(comments).post(add_comment))
        .route("/posts/comments/{id}", delete(delete_comment))
        .with_state(Arc::clone(&recorded));
    let app = Router::new().nest("/api", api);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockServer {
        base_url: Url::parse(&format!("http://{addr}/api/")).unwrap(),
        recorded,
    }
}

/// An address nothing listens on.
pub async fn closed_address() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

type Shared = State<Arc<Recorded>>;

fn header_value<'a>(headers: &'a HeaderMap, name: header::HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

fn signed_in(headers: &HeaderMap) -> bool {
    header_value(headers, header::COOKIE).is_some_and(|cookie| cookie.contains(ALICE_COOKIE))
}

fn alice() -> serde_json::Value {
    json!({
        "username": "alice",
        "registeredAt": "2025-06-01T10:15:30.123456",
        "followerCount": 1,
        "followingCount": 2
    })
}

async fn login(State(recorded): Shared, headers: HeaderMap) -> Response {
    recorded.login_calls.fetch_add(1, Ordering::SeqCst);
    if recorded.hold_login.load(Ordering::SeqCst) {
        recorded.login_release.notified().await;
    }
    if header_value(&headers, header::AUTHORIZATION) != Some(ALICE_BASIC) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    (
        [(header::SET_COOKIE, format!("{ALICE_COOKIE}; Path=/api; HttpOnly"))],
        Json(alice()),
    )
        .into_response()
}

async fn register(State(recorded): Shared, headers: HeaderMap) -> Response {
    recorded.register_calls.fetch_add(1, Ordering::SeqCst);
    match header_value(&headers, header::AUTHORIZATION) {
        Some(ALICE_BASIC) => (StatusCode::CREATED, "User registered successfully").into_response(),
        _ => (
            StatusCode::CONFLICT,
            Json(json!({ "status": 409, "message": "Username already exists" })),
        )
            .into_response(),
    }
}

async fn logout(State(recorded): Shared) -> Response {
    recorded.logout_calls.fetch_add(1, Ordering::SeqCst);
    (StatusCode::INTERNAL_SERVER_ERROR, "logout exploded").into_response()
}

async fn me(headers: HeaderMap) -> Response {
    if !signed_in(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(alice()).into_response()
}

async fn update_me(headers: HeaderMap) -> StatusCode {
    if signed_in(&headers) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::UNAUTHORIZED
    }
}

async fn search(Query(params): Query<HashMap<String, String>>) -> Response {
    let query = params.get("q").cloned().unwrap_or_default();
    let entries: Vec<_> = [("bob", true), ("bobby", false)]
        .into_iter()
        .filter(|(name, _)| name.contains(query.as_str()))
        .map(|(name, following)| json!({ "username": name, "isFollowing": following }))
        .collect();
    Json(entries).into_response()
}

async fn profile(Path(username): Path<String>) -> Response {
    if username == "ghost" {
        return StatusCode::NOT_FOUND.into_response();
    }
    Json(json!({ "username": username, "fullName": "Bob Builder" })).into_response()
}

async fn follow_status(Path(username): Path<String>) -> Response {
    Json(username == "bob").into_response()
}

async fn follow(Path(_username): Path<String>) -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn followers(Path(username): Path<String>) -> Response {
    Json(json!([{ "username": format!("fan-of-{username}") }])).into_response()
}

async fn following(Path(_username): Path<String>) -> Response {
    Json(json!([{ "username": "carol" }, { "username": "dave" }])).into_response()
}

async fn create_post(headers: HeaderMap, body: String) -> Response {
    if header_value(&headers, header::CONTENT_TYPE) != Some("application/json") {
        return StatusCode::UNSUPPORTED_MEDIA_TYPE.into_response();
    }
    let payload: serde_json::Value = serde_json::from_str(&body).unwrap_or_default();
    let content = payload["content"].as_str().unwrap_or_default().to_string();
    if content.contains("forbidden") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "timestamp": "2025-06-01T10:00:00",
                "status": 400,
                "error": "Bad Request",
                "message": "Post rejected by moderation"
            })),
        )
            .into_response();
    }
    (
        StatusCode::CREATED,
        Json(json!({
            "id": 99,
            "content": content,
            "authorUsername": "alice",
            "createdAt": "2025-06-01T10:15:30.123456",
            "likeCount": 0,
            "isLikedByCurrentUser": false
        })),
    )
        .into_response()
}

async fn timeline(headers: HeaderMap) -> Response {
    if !signed_in(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!([
        { "id": 1, "content": "first", "authorUsername": "bob", "likeCount": 2, "isLikedByCurrentUser": true },
        { "id": 2, "content": "second", "authorUsername": "carol", "likeCount": 0 }
    ]))
    .into_response()
}

async fn delete_post(Path(id): Path<i64>) -> StatusCode {
    if id == 1 {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn like(Path(_id): Path<i64>) -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn comments(Path(id): Path<i64>) -> Response {
    if id == 404 {
        return StatusCode::NOT_FOUND.into_response();
    }
    Json(json!([{ "id": 7, "content": "nice", "username": "bob", "createdAt": "2025-06-01T10:00:00" }]))
        .into_response()
}

async fn add_comment(
    State(recorded): Shared,
    Path(_id): Path<i64>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let content_type = header_value(&headers, header::CONTENT_TYPE).map(str::to_string);
    recorded
        .comment_bodies
        .lock()
        .unwrap()
        .push((content_type, body.clone()));
    (
        StatusCode::CREATED,
        Json(json!({ "id": 8, "content": body, "username": "alice" })),
    )
        .into_response()
}

async fn delete_comment(Path(_id): Path<i64>) -> StatusCode {
    StatusCode::NO_CONTENT
}
