//! Typed error definitions for the strategy runtime.
//!
//! Provides [`QtError`] for domain-specific errors that are more informative
//! than plain `anyhow::Error` strings. All variants implement `std::error::Error`
//! via `thiserror`, so they integrate seamlessly with `anyhow::Result`.

use thiserror::Error;

/// Domain-specific errors for the strategy runtime.
#[derive(Debug, Error)]
pub enum QtError {
    /// Configuration parsing or validation error.
    #[error("config error: {0}")]
    Config(String),

    /// Malformed row in the contract reference file (1-based line number).
    #[error("format error at line {line}: {reason}")]
    Format { line: usize, reason: String },

    /// The same ticker appears twice in the contract reference file.
    #[error("duplicate ticker '{ticker}' at line {line}")]
    DuplicateTicker { ticker: String, line: usize },

    /// Ticker lookup miss.
    #[error("unknown ticker: {0}")]
    UnknownTicker(String),

    /// An order was not encoded, so nothing was published.
    #[error("order for '{ticker}' not sent: {reason}")]
    EncodingSkipped { ticker: String, reason: String },

    /// The outbound command queue is at capacity.
    #[error("outbound command queue is full")]
    OutboundQueueFull,

    /// The outbound publisher task is gone.
    #[error("outbound command queue is closed")]
    OutboundClosed,

    /// Message bus unreachable or connection lost.
    #[error("connection error: {0}")]
    Connection(String),

    /// Malformed tick / order response / command payload.
    #[error("decode error: {0}")]
    Decode(String),

    /// Operation is part of the API surface but not supported.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl QtError {
    /// Whether retrying the failed operation may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}

pub type Result<T> = std::result::Result<T, QtError>;
