//! Domain-specific error types for the Tether protocol.
//!
//! All fallible operations return `Result<T, TetherError>`.
//! No panics on invalid input: every error is typed and recoverable.

use thiserror::Error;

/// The canonical error type for the Tether protocol.
#[derive(Debug, Error)]
pub enum TetherError {
    // ── Protocol Errors ──────────────────────────────────────────
    /// Received bytes that do not start with the Tether magic sequence.
    #[error("invalid magic bytes: expected TTH1")]
    InvalidMagic,

    /// The packet payload failed checksum verification.
    #[error("checksum mismatch")]
    ChecksumMismatch,

    /// A numeric value did not map to any known enum variant.
    #[error("unknown {type_name} discriminant: {value:#x}")]
    UnknownVariant { type_name: &'static str, value: u64 },

    /// A packet violated protocol rules.
    #[error("protocol violation: {0}")]
    ProtocolViolation(&'static str),

    // ── Packet Errors ────────────────────────────────────────────
    /// The payload exceeds the configured maximum size.
    #[error("payload too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The received frame is shorter or longer than expected.
    #[error("invalid packet length: expected {expected}, got {actual}")]
    InvalidPacketLength { expected: usize, actual: usize },

    // ── Connection Errors ────────────────────────────────────────
    /// A socket or filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An mpsc channel was closed unexpectedly.
    #[error("channel closed")]
    ChannelClosed,

    /// The peer went away while a call was in flight.
    #[error("peer disconnected")]
    Disconnected,

    /// The host has nothing bound under the requested service name.
    #[error("service not bound: {0}")]
    NotBound(String),

    // ── Serialization Errors ─────────────────────────────────────
    /// Encoding or decoding of a payload failed.
    #[error("encoding error: {0}")]
    Encoding(String),

    // ── Pipeline Errors ──────────────────────────────────────────
    /// Frame compression or decompression failed.
    #[error("codec error: {0}")]
    Codec(String),

    /// The capture source could not produce a snapshot.
    #[error("capture error: {0}")]
    Capture(String),

    /// The input injector rejected an action.
    #[error("injection error: {0}")]
    Injection(String),

    // ── File Exchange Errors ─────────────────────────────────────
    /// A received file name is unsafe to write.
    #[error("invalid file name: {0:?}")]
    InvalidFileName(String),

    // ── Remote Errors ────────────────────────────────────────────
    /// The peer reported a fault while servicing our call.
    #[error("remote fault: {0}")]
    Remote(String),

    /// Catch-all for errors that do not fit another variant.
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TetherError>;

// ── Convenient From implementations ──────────────────────────────

impl From<String> for TetherError {
    fn from(s: String) -> Self {
        TetherError::Other(s)
    }
}

impl From<&str> for TetherError {
    fn from(s: &str) -> Self {
        TetherError::Other(s.to_string())
    }
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for TetherError {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        TetherError::ChannelClosed
    }
}

impl From<Box<bincode::ErrorKind>> for TetherError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        TetherError::Encoding(e.to_string())
    }
}
