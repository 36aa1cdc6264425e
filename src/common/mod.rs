//! # Common Components
//!
//! Shared utilities and data structures used by both client and server components.
//!
//! ## Modules
//!
//! - [`messages`]: Protocol envelope, game results, typed requests and responses
//! - [`codec`]: Newline-delimited JSON framing
//! - [`connection`]: Framed connection over any async stream
//! - [`config`]: Configuration parsing utilities
//! - [`error`]: Error taxonomy and protocol status codes
//! - [`logging`]: Logger setup shared by the binaries

pub mod codec;
pub mod config;
pub mod connection;
pub mod error;
pub mod logging;
pub mod messages;
