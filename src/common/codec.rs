//! # Newline-Delimited JSON Framing
//!
//! One frame is one UTF-8 JSON object followed by a single `\n`. JSON string
//! escaping guarantees the delimiter never appears inside an encoded message.

use super::error::{ArcadeError, Result};
use super::messages::Message;

/// Frame delimiter.
pub const DELIMITER: u8 = b'\n';

/// Serialize a message into one frame (JSON bytes plus trailing `\n`).
pub fn encode(message: &Message) -> Result<Vec<u8>> {
    let mut data = serde_json::to_vec(message)
        .map_err(|e| ArcadeError::malformed("failed to serialize message", Some(e)))?;
    data.push(DELIMITER);
    Ok(data)
}

/// Take the next complete frame out of `buffer`.
///
/// # Returns
/// - `Ok(None)`: no delimiter buffered yet, nothing consumed
/// - `Ok(Some(Message))`: one frame consumed and parsed
/// - `Err(MalformedMessage)`: one frame consumed but it was empty, not JSON,
///   or had no `action`; the caller may keep reading
pub fn decode(buffer: &mut Vec<u8>) -> Result<Option<Message>> {
    let Some(end) = buffer.iter().position(|&b| b == DELIMITER) else {
        return Ok(None);
    };

    let frame: Vec<u8> = buffer.drain(..=end).collect();
    let body = trim_carriage_return(&frame[..end]);

    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ArcadeError::malformed("empty frame", None));
    }

    serde_json::from_slice::<Message>(body)
        .map(Some)
        .map_err(|e| ArcadeError::malformed(format!("invalid JSON frame: {e}"), Some(e)))
}

fn trim_carriage_return(body: &[u8]) -> &[u8] {
    body.strip_suffix(b"\r").unwrap_or(body)
}
