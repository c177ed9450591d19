//! HTTP server for Potlog.
//!
//! Exposes session recording, settlement, preview, and user statistics as
//! a JSON REST API under `/api`.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod types;

use std::sync::Arc;

use potlog_settle::{ServiceConfig, SessionService, SettlementCoordinator};
use potlog_store::SessionStore;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult, ErrorResponse, ServerError, ServerResult};
pub use router::build_router;
pub use server::PotlogServer;

/// Shared state for request handlers. Both halves use the same store.
#[derive(Clone)]
pub struct AppState {
    pub service: SessionService,
    pub coordinator: SettlementCoordinator,
}

impl AppState {
    pub fn new(store: Arc<dyn SessionStore>, config: ServiceConfig) -> Self {
        Self {
            service: SessionService::with_config(store.clone(), config),
            coordinator: SettlementCoordinator::new(store),
        }
    }
}
