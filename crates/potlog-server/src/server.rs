use std::sync::Arc;

use potlog_store::{FileSessionStore, InMemorySessionStore, SessionStore};
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;
use crate::AppState;

/// Potlog HTTP server.
pub struct PotlogServer {
    config: ServerConfig,
    state: AppState,
}

impl PotlogServer {
    /// Server over the store `config` selects: JSON files under `data_dir`,
    /// or memory when no directory is set.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let store: Arc<dyn SessionStore> = match &config.data_dir {
            Some(dir) => Arc::new(FileSessionStore::open(dir)?),
            None => Arc::new(InMemorySessionStore::new()),
        };
        Ok(Self::with_store(config, store))
    }

    pub fn with_store(config: ServerConfig, store: Arc<dyn SessionStore>) -> Self {
        let state = AppState::new(store, config.service_config());
        Self { config, state }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone(), self.config.allow_any_origin)
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!(
            addr = %self.config.bind_addr,
            persistent = self.config.data_dir.is_some(),
            "potlog server listening"
        );
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}
