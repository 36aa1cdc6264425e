//! # Leaderboard Server
//!
//! Accepts TCP connections and hands each one to its own task running a
//! [`ConnectionHandler`]. Connections are independent: a slow or broken
//! client never holds up the others, and all of them share one
//! [`ResultStore`] pool.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info};
use tokio::net::TcpListener;

use super::config::ServerConfig;
use super::handler::ConnectionHandler;
use super::store::ResultStore;
use crate::common::error::{ArcadeError, Result};

/// Pause after a failed `accept` before trying again.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(10);

pub struct ArcadeServer {
    listener: TcpListener,
    handler: Arc<ConnectionHandler>,
}

impl ArcadeServer {
    /// Open the result store from `config.storage` and bind `config.server.address`.
    ///
    /// # Returns
    /// - `Err(Persistence)`: the database could not be opened or initialised
    /// - `Err(AddressInUse)`: another process holds the port
    ///
    /// # Example
    /// ```ignore
    /// let server = ArcadeServer::bind(&ServerConfig::default()).await?;
    /// server.run().await;
    /// ```
    pub async fn bind(config: &ServerConfig) -> Result<Self> {
        let store = ResultStore::open(&config.storage).await?;
        Self::with_store(&config.server.address, store).await
    }

    /// Bind `address` and serve from an already opened store.
    pub async fn with_store(address: &str, store: ResultStore) -> Result<Self> {
        let listener = TcpListener::bind(address).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                ArcadeError::AddressInUse {
                    address: address.to_string(),
                    source: e,
                }
            } else {
                ArcadeError::Transport(e)
            }
        })?;

        info!("📡 Arcade server listening on {}", listener.local_addr()?);

        Ok(Self {
            listener,
            handler: Arc::new(ConnectionHandler::new(store)),
        })
    }

    /// Actual bound address (useful when binding port 0).
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections forever, one task per connection.
    pub async fn run(self) {
        loop {
            match self.listener.accept().await {
                Ok((socket, addr)) => {
                    debug!("🔗 Accepted connection from {}", addr);

                    let handler = Arc::clone(&self.handler);
                    tokio::spawn(async move {
                        handler.handle_connection(socket, &addr.to_string()).await;
                    });
                }
                Err(e) => {
                    error!("❌ Accept error: {}", e);
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                }
            }
        }
    }
}
