//! # Arcade Client
//!
//! Request helper used by the games to talk to the leaderboard server.
//! Each call opens a fresh connection, sends one request, reads exactly one
//! response and closes the socket, so a failed call never leaves a
//! connection behind.
//!
//! Connecting retries a fixed number of times with a fixed pause in between
//! (3 attempts, 2 s apart by default). Nothing else is retried.

use std::io;
use std::sync::Arc;

use log::{info, warn};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::common::config::ClientSettings;
use crate::common::connection::Connection;
use crate::common::error::{ArcadeError, Result};
use crate::common::messages::{
    expect_confirmation, GameKind, GameResult, LeaderboardEntry, Message, Request,
};
use crate::puzzles::hint::{Hint, HintQuery, HintReply};

/// Short-lived-connection client for the leaderboard protocol.
#[derive(Debug, Clone)]
pub struct ArcadeClient {
    settings: ClientSettings,
}

impl ArcadeClient {
    pub fn new(settings: ClientSettings) -> Self {
        Self { settings }
    }

    pub fn server_address(&self) -> &str {
        &self.settings.server_address
    }

    /// Connect to the server, retrying on failure.
    ///
    /// # Returns
    /// - `Ok(Connection)`: connected on one of the attempts
    /// - `Err(Transport)`: the last attempt's error after all attempts failed
    pub async fn connect(&self) -> Result<Connection<TcpStream>> {
        let attempts = self.settings.connect_retries.max(1);
        let address = &self.settings.server_address;

        let mut attempt = 1;

        loop {
            match TcpStream::connect(address).await {
                Ok(stream) => return Ok(Connection::new(stream)),
                Err(e) if attempt < attempts => {
                    warn!(
                        "Connection to {} failed (attempt {}/{}): {}",
                        address, attempt, attempts, e
                    );
                    sleep(self.settings.retry_delay()).await;
                    attempt += 1;
                }
                Err(e) => {
                    warn!(
                        "❌ Could not reach {} after {} attempts: {}",
                        address, attempts, e
                    );
                    return Err(ArcadeError::Transport(e));
                }
            }
        }
    }

    /// Send one message and wait for its single response.
    pub async fn send_and_receive(&self, message: &Message) -> Result<Message> {
        let mut conn = self.connect().await?;
        conn.write_message(message).await?;

        match conn.read_message().await? {
            Some(response) => Ok(response),
            None => Err(ArcadeError::Transport(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "server closed the connection without answering",
            ))),
        }
    }

    /// Store a finished session on the server.
    pub async fn save_result(&self, result: &GameResult) -> Result<()> {
        let request = Request::SaveResult(result.clone()).to_message()?;
        expect_confirmation(self.send_and_receive(&request).await?)?;
        info!("🏁 Reported {} result to {}", result.kind(), self.server_address());
        Ok(())
    }

    /// Fetch the leaderboard of one game, best first.
    pub async fn request_best(&self, kind: GameKind) -> Result<Vec<LeaderboardEntry>> {
        let request = Request::RequestBest(kind).to_message()?;
        let response = expect_confirmation(self.send_and_receive(&request).await?)?;

        match response.get("mejores") {
            Some(Value::Array(entries)) => entries
                .iter()
                .map(|entry| LeaderboardEntry::from_value(kind, entry))
                .collect(),
            _ => Err(ArcadeError::validation("response without mejores list")),
        }
    }

    /// Ask the server to compute the next move for a game snapshot.
    pub async fn request_hint(&self, query: &HintQuery) -> Result<HintReply> {
        let kind = query.kind();
        let request = Request::RequestHint(query.clone()).to_message()?;
        let response = expect_confirmation(self.send_and_receive(&request).await?)?;

        let hint = response
            .get("sugerencia")
            .and_then(|value| Hint::from_value(kind, value));
        let message = response
            .get("mensaje")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Ok(HintReply { hint, message })
    }
}

/// Report a result in the background so the game loop never waits on the
/// network. Failures are logged; the handle can be awaited or dropped.
pub fn spawn_report(client: Arc<ArcadeClient>, result: GameResult) -> JoinHandle<Result<()>> {
    tokio::spawn(async move {
        let outcome = client.save_result(&result).await;
        if let Err(e) = &outcome {
            warn!("⚠️  Could not report {} result: {}", result.kind(), e);
        }
        outcome
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};
    use tokio::net::TcpListener;

    async fn closed_port() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        drop(listener);
        address
    }

    #[tokio::test]
    async fn connect_gives_up_after_configured_attempts() {
        let client = ArcadeClient::new(ClientSettings {
            server_address: closed_port().await,
            connect_retries: 3,
            retry_delay_ms: 20,
        });

        let started = Instant::now();
        let Err(err) = client.connect().await else {
            panic!("connect to a closed port should fail");
        };
        assert!(matches!(err, ArcadeError::Transport(_)), "{err}");
        // Two pauses between three attempts.
        assert!(started.elapsed() >= Duration::from_millis(40));
    }

    #[tokio::test]
    async fn server_error_reply_becomes_remote_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();

        tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let mut conn = Connection::new(socket);
            let _request = conn.read_message().await.unwrap();
            let reply = crate::common::messages::Response::Error {
                code: 500,
                message: "database is locked".into(),
            };
            conn.write_message(&reply.into_message()).await.unwrap();
        });

        let client = ArcadeClient::new(ClientSettings {
            server_address: address,
            connect_retries: 1,
            retry_delay_ms: 0,
        });
        match client.request_best(GameKind::Hanoi).await.unwrap_err() {
            ArcadeError::Remote { code, message } => {
                assert_eq!(code, 500);
                assert_eq!(message, "database is locked");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn silent_server_is_a_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();

        tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let mut conn = Connection::new(socket);
            let _request = conn.read_message().await.unwrap();
        });

        let client = ArcadeClient::new(ClientSettings {
            server_address: address,
            connect_retries: 1,
            retry_delay_ms: 0,
        });
        let err = client.request_best(GameKind::NQueens).await.unwrap_err();
        assert!(matches!(err, ArcadeError::Transport(_)), "{err}");
    }
}
