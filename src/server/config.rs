use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::common::config::load_config;

/// Leaderboard server configuration.
///
/// ```toml
/// [server]
/// address = "0.0.0.0:5000"
///
/// [storage]
/// database_url = "sqlite://resultados.db"
/// max_connections = 4
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerInfo,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerInfo {
    pub address: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            address: "0.0.0.0:5000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite URL; the file is created on first start
    pub database_url: String,
    pub max_connections: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://resultados.db".to_string(),
            max_connections: 4,
        }
    }
}

impl ServerConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        load_config(path)
    }
}
