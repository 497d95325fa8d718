//! reelstamp Core Library
//!
//! Media and subtitle timestamp value type.
//! Parses `HH:MM:SS[.,]mmm` strings, formats them for SRT files and video
//! tools, converts to and from decimal seconds, and subtracts timestamps.
//!
//! ## Modules
//!
//! - `timestamp` - the `Timestamp` value and `MinutesFormula`
//! - `filter` - FFmpeg `trim`/`atrim` filter strings for a timestamp range
//! - `settings` - persisted conversion settings

pub mod filter;
pub mod settings;

mod timestamp;
pub use timestamp::{MinutesFormula, Timestamp};

mod error;
pub use error::*;

pub use filter::TrimRange;
pub use settings::{NegativeSecondsPolicy, SettingsStore, TimestampSettings};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
