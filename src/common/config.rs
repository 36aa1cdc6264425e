//! # Configuration Utilities
//!
//! TOML loading shared by the binaries, plus the client-side settings.
//! Every field has a default, so a missing file section (or no file at all)
//! yields a working configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;

/// Load a TOML configuration file and deserialize it into the specified type.
///
/// # Arguments
/// - `path`: Path to the TOML configuration file
///
/// # Example
/// ```ignore
/// let config: ServerConfig = load_config("config/server.toml")?;
/// ```
pub fn load_config<T>(path: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read config file {path}"))?;
    let config: T =
        toml::from_str(&content).with_context(|| format!("failed to parse config file {path}"))?;
    Ok(config)
}

/// Load `path` if given, otherwise fall back to `T::default()`.
pub fn load_config_or_default<T>(path: Option<&str>) -> Result<T>
where
    T: for<'de> Deserialize<'de> + Default,
{
    match path {
        Some(path) => load_config(path),
        None => Ok(T::default()),
    }
}

/// Top-level client configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub client: ClientSettings,
}

/// Where the arcade server lives and how hard to try reaching it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Server address (e.g., "127.0.0.1:5000")
    pub server_address: String,
    /// Connection attempts before giving up
    pub connect_retries: u32,
    /// Fixed pause between attempts (milliseconds)
    pub retry_delay_ms: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server_address: "127.0.0.1:5000".to_string(),
            connect_retries: 3,
            retry_delay_ms: 2000,
        }
    }
}

impl ClientSettings {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}
