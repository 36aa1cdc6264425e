//! # Error Taxonomy
//!
//! Every failure the arcade can hit on the wire or in storage is one variant of
//! [`ArcadeError`]. The connection handler turns them into protocol error codes
//! with [`ArcadeError::status_code`].

/// Errors raised by the protocol, the result store and the client helper.
#[derive(Debug, thiserror::Error)]
pub enum ArcadeError {
    /// A frame was not valid JSON or lacked the `action` field.
    #[error("malformed message: {reason}")]
    MalformedMessage {
        reason: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Unknown action, unknown game kind, or a missing/invalid field.
    #[error("{reason}")]
    Validation { reason: String },

    /// The SQLite store failed or is unavailable.
    #[error("persistence error: {reason}")]
    Persistence {
        reason: String,
        #[source]
        source: Option<sqlx::Error>,
    },

    #[error("address {address} is already in use")]
    AddressInUse {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// Peer disconnect or socket fault.
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// The server answered with an `error` response.
    #[error("server replied with error {code}: {message}")]
    Remote { code: u16, message: String },

    /// A worker task panicked or was cancelled.
    #[error("internal error: {reason}")]
    Internal { reason: String },
}

impl ArcadeError {
    pub fn validation(reason: impl Into<String>) -> Self {
        ArcadeError::Validation {
            reason: reason.into(),
        }
    }

    pub fn malformed(reason: impl Into<String>, source: Option<serde_json::Error>) -> Self {
        ArcadeError::MalformedMessage {
            reason: reason.into(),
            source,
        }
    }

    /// Build a `map_err` adapter that wraps a sqlx failure with some context.
    pub fn persistence(context: &'static str) -> impl FnOnce(sqlx::Error) -> Self {
        move |e| ArcadeError::Persistence {
            reason: format!("{context}: {e}"),
            source: Some(e),
        }
    }

    /// Protocol code reported to the peer for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ArcadeError::MalformedMessage { .. } | ArcadeError::Validation { .. } => 400,
            ArcadeError::Remote { code, .. } => *code,
            _ => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, ArcadeError>;
