//! FFmpeg Trim Filter Builder
//!
//! Converts a start/end timestamp pair into FFmpeg `trim`/`atrim` filter strings.
//! Offsets are rendered with [`Timestamp::to_seconds_string`], so no floating
//! point rounding reaches the command line.
//!
//! # Example
//!
//! ```rust
//! use reelstamp_core::{Timestamp, TrimRange};
//!
//! let range = TrimRange::new(
//!     Timestamp::parse("00:00:03.140").unwrap(),
//!     Timestamp::parse("01:01:42.460").unwrap(),
//! )
//! .unwrap();
//!
//! assert_eq!(range.to_trim_filter(), "trim=start=3.140:end=3702.460");
//! ```

use serde::Serialize;

use crate::{MinutesFormula, Timestamp, TimestampError, TimestampResult};

/// A span of media between two timestamps; `end` never precedes `start`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TrimRange {
    start: Timestamp,
    end: Timestamp,
}

impl TrimRange {
    /// Creates a range, rejecting an end that precedes the start
    pub fn new(start: Timestamp, end: Timestamp) -> TimestampResult<Self> {
        if end < start {
            return Err(TimestampError::NegativeDuration {
                minuend: end,
                subtrahend: start,
            });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> Timestamp {
        self.start
    }

    pub fn end(&self) -> Timestamp {
        self.end
    }

    /// Length of the range
    pub fn duration(&self) -> Timestamp {
        Timestamp::from_total_milliseconds(
            self.end.total_milliseconds() - self.start.total_milliseconds(),
            MinutesFormula::Conventional,
        )
    }

    /// Video trim filter body: `trim=start=S:end=E`
    pub fn to_trim_filter(&self) -> String {
        format!("trim={}", self.bounds())
    }

    /// Audio trim filter body: `atrim=start=S:end=E`
    pub fn to_atrim_filter(&self) -> String {
        format!("atrim={}", self.bounds())
    }

    /// Labelled filter chain that trims and resets presentation timestamps.
    ///
    /// Returns `[input]trim=...,setpts=PTS-STARTPTS[output]`, or the
    /// `atrim`/`asetpts` pair when `audio` is set.
    pub fn to_filter_string(&self, input_label: &str, output_label: &str, audio: bool) -> String {
        let body = if audio {
            format!("{},asetpts=PTS-STARTPTS", self.to_atrim_filter())
        } else {
            format!("{},setpts=PTS-STARTPTS", self.to_trim_filter())
        };
        format!("[{input_label}]{body}[{output_label}]")
    }

    fn bounds(&self) -> String {
        format!(
            "start={}:end={}",
            self.start.to_seconds_string(),
            self.end.to_seconds_string()
        )
    }
}
