//! reelstamp Error Definitions
//!
//! Defines the error type shared by the timestamp, filter and settings modules.

use thiserror::Error;

use crate::Timestamp;

/// Timestamp error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimestampError {
    // =========================================================================
    // Construction Errors
    // =========================================================================
    /// Input did not match `HH:MM:SS`, `HH:MM:SS.mmm` or `HH:MM:SS,mmm`
    #[error("Incorrect timestamp string format: {0:?}")]
    InvalidFormat(String),

    /// Seconds value was negative, NaN, infinite or too large for a timestamp
    #[error("Invalid seconds value: {0}")]
    InvalidSeconds(f64),

    // =========================================================================
    // Arithmetic Errors
    // =========================================================================
    #[error("Negative duration: {minuend} is earlier than {subtrahend}")]
    NegativeDuration {
        minuend: Timestamp,
        subtrahend: Timestamp,
    },

    // =========================================================================
    // Settings Errors
    // =========================================================================
    #[error("Settings error: {0}")]
    Settings(String),
}

/// Timestamp result type
pub type TimestampResult<T> = Result<T, TimestampError>;

impl TimestampError {
    /// Returns true for errors caused by malformed caller input
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::InvalidFormat(_) | Self::InvalidSeconds(_))
    }
}
