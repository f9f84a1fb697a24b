//! Session lifecycle: who is signed in, and keeping that across restarts.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use shared::models::UserSummary;
use tracing::{info, warn};

use crate::{
    error::{ApiError, ApiResult},
    request::{ApiRequest, Credentials, RequestClient},
    store::SessionStore,
};

/// Storage key holding the serialized signed-in user.
pub const USER_STORAGE_KEY: &str = "relay_current_user";
/// Storage key holding the exported session cookies.
pub const COOKIE_STORAGE_KEY: &str = "relay_session_cookies";

const LOGIN_PATH: &str = "users/login";
const REGISTER_PATH: &str = "users/register";
const LOGOUT_PATH: &str = "users/logout";

/// Where the session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// `initialize` has not run yet.
    Uninitialized,
    /// Startup, sign-in or sign-up is in flight.
    Loading,
    /// A user is signed in.
    Authenticated,
    /// Nobody is signed in.
    Anonymous,
}

#[derive(Debug, Default)]
struct SessionState {
    user: Option<UserSummary>,
    initialized: bool,
    pending: usize,
    auth_error: Option<String>,
}

/// Single source of truth for the signed-in user.
///
/// The identity is persisted through a [`SessionStore`] together with the
/// session cookies, restored once by [`Self::initialize`], and dropped on
/// sign-out or when the server rejects the session. The authentication flag
/// is always derived from the stored user; there is no separate boolean.
#[derive(Debug)]
pub struct SessionManager {
    client: RequestClient,
    store: Arc<dyn SessionStore>,
    state: Mutex<SessionState>,
}

impl SessionManager {
    pub fn new(client: RequestClient, store: Arc<dyn SessionStore>) -> Self {
        Self {
            client,
            store,
            state: Mutex::new(SessionState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Restores the persisted session. Runs once; later calls do nothing.
    ///
    /// Never fails: unreadable storage means "nobody signed in", and an
    /// entry that does not parse is deleted.
    pub fn initialize(&self) {
        if self.state().initialized {
            return;
        }

        let _loading = LoadingGuard::enter(self);
        let restored = self.restore();

        let mut state = self.state();
        state.user = restored;
        state.initialized = true;
    }

    fn restore(&self) -> Option<UserSummary> {
        let raw = match self.store.load(USER_STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!(error = %err, "failed to read persisted session");
                return None;
            }
        };

        match serde_json::from_str::<UserSummary>(&raw) {
            Ok(user) => {
                match self.store.load(COOKIE_STORAGE_KEY) {
                    Ok(Some(cookies)) => self.client.import_cookies(&cookies),
                    Ok(None) => {}
                    Err(err) => warn!(error = %err, "failed to read persisted cookies"),
                }
                info!(username = %user.username, "restored session");
                Some(user)
            }
            Err(err) => {
                warn!(error = %err, "discarding unreadable persisted session");
                self.discard_persisted();
                None
            }
        }
    }

    /// Authenticates and makes the returned identity the current session.
    ///
    /// On failure the previous session, if any, is left as it was and the
    /// message is kept in [`Self::auth_error`].
    ///
    /// # Errors
    /// Returns the classified [`ApiError`] from the login endpoint.
    pub async fn sign_in(&self, username: &str, password: &str) -> ApiResult<UserSummary> {
        let _loading = LoadingGuard::enter(self);
        self.state().auth_error = None;

        let request =
            ApiRequest::post(LOGIN_PATH).with_credentials(Credentials::new(username, password));
        let result = match self.client.send(request).await {
            Ok(body) => body
                .into_optional_model::<UserSummary>()
                .map(|user| user.unwrap_or_else(|| UserSummary::new(username))),
            Err(err) => Err(err),
        };

        match result {
            Ok(user) => {
                self.persist(&user);
                let mut state = self.state();
                state.user = Some(user.clone());
                state.initialized = true;
                info!(username = %user.username, "signed in");
                Ok(user)
            }
            Err(err) => {
                self.record_failure(&err);
                Err(err)
            }
        }
    }

    /// Registers an account, then signs in with the same credentials.
    ///
    /// Registration alone does not create a session. If registration fails
    /// no sign-in is attempted.
    ///
    /// # Errors
    /// Returns the classified [`ApiError`] from whichever step failed.
    pub async fn sign_up(&self, username: &str, password: &str) -> ApiResult<UserSummary> {
        let _loading = LoadingGuard::enter(self);
        self.state().auth_error = None;

        let request =
            ApiRequest::post(REGISTER_PATH).with_credentials(Credentials::new(username, password));
        if let Err(err) = self.client.send(request).await {
            self.record_failure(&err);
            return Err(err);
        }

        info!(username, "registered account");
        self.sign_in(username, password).await
    }

    /// Tells the server, then forgets the session locally no matter what
    /// the server said.
    pub async fn sign_out(&self) {
        if let Err(err) = self.client.send(ApiRequest::post(LOGOUT_PATH)).await {
            warn!(error = %err, kind = %err.kind(), "logout request failed");
        }
        self.clear();
        info!("signed out");
    }

    /// Drops the session after the server rejected it.
    pub fn evict(&self) {
        if self.is_authenticated() {
            warn!("session rejected by server; signing out locally");
        }
        self.clear();
    }

    fn clear(&self) {
        self.discard_persisted();
        self.client.clear_cookies();
        let mut state = self.state();
        state.user = None;
        state.auth_error = None;
    }

    fn persist(&self, user: &UserSummary) {
        match serde_json::to_string(user) {
            Ok(raw) => {
                if let Err(err) = self.store.save(USER_STORAGE_KEY, &raw) {
                    warn!(error = %err, "failed to persist session");
                }
            }
            Err(err) => warn!(error = %err, "failed to serialize session"),
        }

        let saved = match self.client.export_cookies() {
            Some(cookies) => self.store.save(COOKIE_STORAGE_KEY, &cookies),
            None => self.store.remove(COOKIE_STORAGE_KEY),
        };
        if let Err(err) = saved {
            warn!(error = %err, "failed to persist session cookies");
        }
    }

    fn discard_persisted(&self) {
        for key in [USER_STORAGE_KEY, COOKIE_STORAGE_KEY] {
            if let Err(err) = self.store.remove(key) {
                warn!(error = %err, key, "failed to clear persisted session");
            }
        }
    }

    fn record_failure(&self, err: &ApiError) {
        let message = if err.message().trim().is_empty() {
            "Sign in failed".to_string()
        } else {
            err.message().to_string()
        };
        self.state().auth_error = Some(message);
    }

    pub fn current_user(&self) -> Option<UserSummary> {
        self.state().user.clone()
    }

    pub fn username(&self) -> Option<String> {
        self.state().user.as_ref().map(|user| user.username.clone())
    }

    /// Exactly "a user is present".
    pub fn is_authenticated(&self) -> bool {
        self.state().user.is_some()
    }

    /// True only while startup, sign-in or sign-up is in flight.
    pub fn loading(&self) -> bool {
        self.state().pending > 0
    }

    pub fn status(&self) -> SessionStatus {
        let state = self.state();
        if state.pending > 0 {
            SessionStatus::Loading
        } else if !state.initialized {
            SessionStatus::Uninitialized
        } else if state.user.is_some() {
            SessionStatus::Authenticated
        } else {
            SessionStatus::Anonymous
        }
    }

    /// The message of the last failed sign-in or sign-up.
    pub fn auth_error(&self) -> Option<String> {
        self.state().auth_error.clone()
    }

    pub fn reset_error(&self) {
        self.state().auth_error = None;
    }

    pub fn client(&self) -> &RequestClient {
        &self.client
    }
}

/// Marks the manager as loading for as long as it lives. Nested guards
/// (sign-up calling sign-in) keep it loading until the outermost one drops.
struct LoadingGuard<'a> {
    manager: &'a SessionManager,
}

impl<'a> LoadingGuard<'a> {
    fn enter(manager: &'a SessionManager) -> Self {
        manager.state().pending += 1;
        Self { manager }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.manager.state();
        state.pending = state.pending.saturating_sub(1);
    }
}
