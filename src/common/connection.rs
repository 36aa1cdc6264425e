//! # Stream Connection Abstraction
//!
//! Wraps any async byte stream (a `TcpStream` in production, an in-memory
//! duplex pipe in tests) with newline-delimited JSON framing.
//!
//! ## Wire Protocol
//!
//! ```text
//! {"action":"...", ...}\n{"action":"...", ...}\n
//! ```
//!
//! Bytes are buffered across reads, so a frame may arrive split over several
//! TCP segments and several frames may arrive in one segment.

use log::debug;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

use super::codec;
use super::error::Result;
use super::messages::Message;

/// Bytes requested from the socket per read.
const READ_CHUNK_SIZE: usize = 4096;

/// Framed connection over a byte stream.
pub struct Connection<S = TcpStream> {
    stream: S,
    /// Bytes received but not yet consumed as a complete frame
    buffer: Vec<u8>,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Create a new Connection from an established stream.
    ///
    /// # Example
    /// ```ignore
    /// let stream = TcpStream::connect("127.0.0.1:5000").await?;
    /// let mut conn = Connection::new(stream);
    /// ```
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            buffer: Vec::with_capacity(READ_CHUNK_SIZE),
        }
    }

    /// Read the next message from the connection.
    ///
    /// # Returns
    /// - `Ok(Some(Message))`: a complete frame was decoded
    /// - `Ok(None)`: the peer closed the stream; any partial frame is discarded
    /// - `Err(MalformedMessage)`: one bad frame was skipped, the stream is still usable
    /// - `Err(Transport)`: socket failure, the connection should be dropped
    ///
    /// # Example
    /// ```ignore
    /// while let Some(message) = conn.read_message().await? {
    ///     println!("{} at {:?}", message.action, message.timestamp);
    /// }
    /// ```
    pub async fn read_message(&mut self) -> Result<Option<Message>> {
        let mut chunk = [0u8; READ_CHUNK_SIZE];

        loop {
            if let Some(message) = codec::decode(&mut self.buffer)? {
                return Ok(Some(message));
            }

            let read = self.stream.read(&mut chunk).await?;
            if read == 0 {
                if !self.buffer.is_empty() {
                    debug!(
                        "Discarding {} bytes of unterminated frame at end of stream",
                        self.buffer.len()
                    );
                    self.buffer.clear();
                }
                return Ok(None);
            }
            self.buffer.extend_from_slice(&chunk[..read]);
        }
    }

    /// Write one framed message and flush it.
    pub async fn write_message(&mut self, message: &Message) -> Result<()> {
        let data = codec::encode(message)?;
        self.stream.write_all(&data).await?;
        self.stream.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::ArcadeError;
    use tokio::io::duplex;

    #[tokio::test]
    async fn messages_cross_a_duplex_pipe() {
        let (left, right) = duplex(64);
        let mut sender = Connection::new(left);
        let mut receiver = Connection::new(right);

        let outgoing = Message::new("request_best").with("juego", serde_json::json!("hanoi"));
        let expected = outgoing.clone();
        let writer = tokio::spawn(async move {
            sender.write_message(&outgoing).await.unwrap();
            sender
        });

        let received = receiver.read_message().await.unwrap().unwrap();
        assert_eq!(received, expected);
        drop(writer.await.unwrap());

        assert!(receiver.read_message().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn malformed_frame_does_not_poison_the_stream() {
        let (mut raw, right) = duplex(256);
        let mut receiver = Connection::new(right);

        raw.write_all(b"{oops\n{\"action\":\"request_best\"}\n{\"action\":\"cut").await.unwrap();
        drop(raw);

        assert!(matches!(
            receiver.read_message().await,
            Err(ArcadeError::MalformedMessage { .. })
        ));
        assert_eq!(
            receiver.read_message().await.unwrap().unwrap().action,
            "request_best"
        );
        // Unterminated tail is dropped at end of stream.
        assert!(receiver.read_message().await.unwrap().is_none());
    }
}
