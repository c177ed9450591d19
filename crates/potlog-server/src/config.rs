use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use potlog_settle::ServiceConfig;
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

/// Environment variable that overrides the listening port.
pub const PORT_ENV: &str = "PORT";

const DEFAULT_BIND_ADDR: ([u8; 4], u16) = ([127, 0, 0, 1], 8080);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Send permissive CORS headers so a browser UI on any origin can call
    /// the API.
    pub allow_any_origin: bool,
    pub max_players_per_session: usize,
    pub id_allocation_attempts: usize,
    /// Keep sessions as JSON files under this directory. In memory when unset.
    pub data_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let service = ServiceConfig::default();
        Self {
            bind_addr: SocketAddr::from(DEFAULT_BIND_ADDR),
            allow_any_origin: true,
            max_players_per_session: service.max_players,
            id_allocation_attempts: service.id_allocation_attempts,
            data_dir: None,
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(input: &str) -> ServerResult<Self> {
        toml::from_str(input).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Read a TOML config file. Keys left out keep their defaults.
    pub fn load(path: &Path) -> ServerResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Apply a `PORT` value, keeping the configured host.
    pub fn with_port_override(mut self, port: Option<&str>) -> ServerResult<Self> {
        if let Some(raw) = port {
            let port: u16 = raw
                .trim()
                .parse()
                .map_err(|_| ServerError::Config(format!("invalid {PORT_ENV} value: {raw:?}")))?;
            self.bind_addr.set_port(port);
        }
        Ok(self)
    }

    /// [`with_port_override`](Self::with_port_override) from the process
    /// environment.
    pub fn with_env(self) -> ServerResult<Self> {
        let port = std::env::var(PORT_ENV).ok();
        self.with_port_override(port.as_deref())
    }

    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            max_players: self.max_players_per_session,
            id_allocation_attempts: self.id_allocation_attempts,
        }
    }
}
