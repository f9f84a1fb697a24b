#![cfg_attr(not(test), forbid(unsafe_code))]
#![warn(clippy::pedantic)]

//! Client core for the Relay social network.
//!
//! [`RequestClient`] is the only component that talks to the network. It
//! attaches the session cookie, encodes request bodies, decodes responses by
//! content type, and classifies failures into an [`ApiError`].
//! [`SessionManager`] owns the signed-in identity and its persistence, and
//! [`RelayApi`] layers the typed Relay operations on top of both.
//! [`AppContext`] wires the three together for a view layer.

pub mod api;
pub mod body;
pub mod call;
pub mod context;
pub mod cookies;
pub mod error;
pub mod observer;
pub mod request;
pub mod session;
pub mod store;

pub use api::{Connections, RelayApi};
pub use body::{RequestBody, ResponseBody};
pub use call::CallState;
pub use context::{AppContext, ContextError};
pub use cookies::CookieVault;
pub use error::{ApiError, ApiResult, ErrorKind};
pub use observer::{RequestEvent, RequestObserver, TracingObserver};
pub use request::{ApiRequest, Credentials, RequestClient};
pub use session::{COOKIE_STORAGE_KEY, SessionManager, SessionStatus, USER_STORAGE_KEY};
pub use store::{FileStore, MemoryStore, SessionStore, StoreError};
