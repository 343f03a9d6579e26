//! Error types for finchart-codec

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Amount out of range: {amount} exceeds {max} minor units")]
    AmountOutOfRange { amount: String, max: i64 },

    #[error("Invalid document: {message}")]
    InvalidDocument { message: String },

    #[error("Invalid timestamp: {seconds}s {nanoseconds}ns")]
    InvalidTimestamp { seconds: i64, nanoseconds: u32 },

    #[error("JSON error")]
    Json(#[from] serde_json::Error),
}

/// Result type with CodecError
pub type CodecResult<T> = Result<T, CodecError>;
