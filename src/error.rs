//! The crate-wide error type. Every fallible public API returns
//! `Result<T, CrosswordError>` so the CLI driver can print a single
//! diagnostic line and exit non-zero on any failure.

use crate::types::SlotId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrosswordError {
    #[error("invalid puzzle geometry: {0}")]
    InvalidPuzzle(String),

    #[error("answer length {actual} does not match slot {slot} (expected {expected})")]
    LengthMismatch {
        slot: SlotId,
        expected: usize,
        actual: usize,
    },

    #[error("answer for slot {slot} conflicts with an existing letter")]
    Conflict { slot: SlotId },

    #[error("no historical record for clue {0:?}")]
    NotFound(String),

    #[error("parse error at {context}: {message}")]
    ParseError { context: String, message: String },

    #[error("configuration error: {0}")]
    ConfigurationError(String),

    #[error("compatibility graph has {actual} nodes, exceeding the configured cap of {cap}")]
    CapacityExceeded { actual: usize, cap: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),
}

pub type Result<T> = std::result::Result<T, CrosswordError>;
