//! Explicit wiring of the session and API for the view layer.

use std::sync::Arc;

use shared::config::{Config, ConfigError};
use thiserror::Error;
use url::Url;

use crate::{
    api::RelayApi,
    error::ApiError,
    request::RequestClient,
    session::SessionManager,
    store::{FileStore, SessionStore},
};

#[derive(Debug, Error)]
pub enum ContextError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to create the request client: {0}")]
    Client(#[from] ApiError),
}

/// Owns the one [`SessionManager`] and the [`RelayApi`] built on it.
///
/// Views receive this instead of constructing either piece themselves.
/// Cloning is cheap and every clone shares the same session.
#[derive(Debug, Clone)]
pub struct AppContext {
    session: Arc<SessionManager>,
    api: RelayApi,
}

impl AppContext {
    /// Wires a context and restores the persisted session.
    pub fn new(client: RequestClient, store: Arc<dyn SessionStore>) -> Self {
        let session = Arc::new(SessionManager::new(client, store));
        session.initialize();
        let api = RelayApi::new(Arc::clone(&session));
        Self { session, api }
    }

    /// Builds the client and file-backed store described by `config`.
    ///
    /// # Errors
    /// Returns [`ContextError`] if the API URL is invalid or the HTTP client
    /// cannot be built.
    pub fn from_config(config: &Config) -> Result<Self, ContextError> {
        let base_url: Url = config.api_base_url()?;
        let client = RequestClient::builder(base_url)
            .user_agent(config.user_agent.clone())
            .build()?;
        let store = Arc::new(FileStore::new(config.session_dir.clone()));
        Ok(Self::new(client, store))
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn api(&self) -> &RelayApi {
        &self.api
    }
}
