//! # Connection Handler
//!
//! Runs the request/response loop of one client connection: every complete
//! frame gets exactly one reply, in arrival order. A bad frame is answered
//! with an error and the loop keeps going; only end of stream or a socket
//! failure ends it.

use log::{debug, info, warn};
use tokio::io::{AsyncRead, AsyncWrite};

use super::store::ResultStore;
use crate::common::connection::Connection;
use crate::common::error::{ArcadeError, Result};
use crate::common::messages::{Message, Request, Response, BEST_RESULTS_LIMIT};

/// Turns protocol messages into store operations and hint computations.
#[derive(Clone)]
pub struct ConnectionHandler {
    store: ResultStore,
}

impl ConnectionHandler {
    pub fn new(store: ResultStore) -> Self {
        Self { store }
    }

    /// Serve one connection until the peer closes it.
    ///
    /// # Arguments
    /// - `stream`: the accepted socket (or any async byte stream)
    /// - `peer`: peer label used in log lines
    pub async fn handle_connection<S>(&self, stream: S, peer: &str)
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut conn = Connection::new(stream);

        loop {
            let response = match conn.read_message().await {
                Ok(Some(message)) => self.dispatch(message).await,
                Ok(None) => {
                    debug!("🔌 Connection from {} closed", peer);
                    break;
                }
                Err(e @ ArcadeError::MalformedMessage { .. }) => {
                    warn!("⚠️  Bad frame from {}: {}", peer, e);
                    Response::error(&e)
                }
                Err(e) => {
                    debug!("🔌 Connection from {} dropped: {}", peer, e);
                    break;
                }
            };

            if let Err(e) = conn.write_message(&response.into_message()).await {
                debug!("🔌 Failed to answer {}: {}", peer, e);
                break;
            }
        }
    }

    /// Handle one decoded message. Never fails: errors become error responses.
    pub async fn dispatch(&self, message: Message) -> Response {
        let action = message.action.clone();
        match self.process(&message).await {
            Ok(response) => response,
            Err(e) => {
                warn!("⚠️  {} request failed: {}", action, e);
                Response::error(&e)
            }
        }
    }

    async fn process(&self, message: &Message) -> Result<Response> {
        match Request::try_from(message)? {
            Request::SaveResult(result) => {
                let id = self.store.save(&result).await?;
                info!(
                    "🏁 Saved {} result #{} ({})",
                    result.kind(),
                    id,
                    if result.outcome.succeeded() { "finished" } else { "unfinished" }
                );
                Ok(Response::Saved)
            }
            Request::RequestBest(kind) => {
                let entries = self.store.top_n(kind, BEST_RESULTS_LIMIT).await?;
                debug!("Serving {} best {} results", entries.len(), kind);
                Ok(Response::Best(entries))
            }
            Request::RequestHint(query) => {
                let kind = query.kind();
                // Backtracking can take a while on larger boards.
                let hint = tokio::task::spawn_blocking(move || query.answer())
                    .await
                    .map_err(|e| ArcadeError::Internal {
                        reason: format!("hint task failed: {e}"),
                    })?;
                Ok(Response::Hint { kind, hint })
            }
        }
    }
}
