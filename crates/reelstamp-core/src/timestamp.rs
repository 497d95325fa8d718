//! Timestamp Value Type
//!
//! A media/subtitle timestamp (`HH:MM:SS.mmm`) with conversions to and from
//! decimal seconds and the two string conventions used downstream:
//! - `HH:MM:SS.mmm` for video tools
//! - `HH:MM:SS,mmm` for SRT subtitle files
//!
//! # Example
//!
//! ```rust
//! use reelstamp_core::Timestamp;
//!
//! let ts = Timestamp::parse("10:20:30,500").unwrap();
//! assert_eq!(ts.to_string(), "10:20:30.500");
//! assert_eq!(ts.to_string_for_srt(), "10:20:30,500");
//! assert_eq!(ts.to_seconds_string(), "37230.500");
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, warn};

use crate::{TimestampError, TimestampResult};

const SECONDS_PER_HOUR: u64 = 3600;
const SECONDS_PER_MINUTE: u64 = 60;
const MILLIS_PER_SECOND: u64 = 1000;

/// Exclusive upper bound for seconds input; whole seconds must fit in `u64`.
const MAX_SECONDS: f64 = u64::MAX as f64;

fn timestamp_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([0-9]{2}):([0-5][0-9]):([0-5][0-9])(?:[.,]([0-9]{3}))?$")
            .expect("timestamp pattern is a valid regex")
    })
}

// =============================================================================
// Minutes Formula
// =============================================================================

/// How the minutes field is derived when building a timestamp from seconds.
///
/// `Legacy` computes `(whole_seconds / 3600) % 60`, which keeps output
/// identical to existing consumers (`3882.46` renders as `01:01:42.460`).
/// `Conventional` computes `(whole_seconds / 60) % 60`. The two agree below
/// one hour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MinutesFormula {
    #[default]
    Legacy,
    Conventional,
}

impl MinutesFormula {
    /// Returns the configuration name of the formula
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::Conventional => "conventional",
        }
    }

    fn minutes(self, whole_seconds: u64) -> u8 {
        let minutes = match self {
            Self::Legacy => whole_seconds / SECONDS_PER_HOUR % 60,
            Self::Conventional => whole_seconds / SECONDS_PER_MINUTE % 60,
        };
        minutes as u8
    }
}

impl fmt::Display for MinutesFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Timestamp
// =============================================================================

/// Media timestamp starting from `00:00:00.000`.
///
/// Minutes and seconds are always in `0..=59`, milliseconds in `0..=999`.
/// Hours have no upper bound and render wider than two digits when needed.
/// Field order makes the derived `Ord` chronological.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    hours: u64,
    minutes: u8,
    seconds: u8,
    milliseconds: u16,
}

impl Timestamp {
    /// Parses `HH:MM:SS`, `HH:MM:SS.mmm` or `HH:MM:SS,mmm`.
    ///
    /// The whole string must match: exactly two hour digits, minutes and
    /// seconds in `00..=59`, and exactly three millisecond digits when present.
    pub fn parse(s: &str) -> TimestampResult<Self> {
        let caps = timestamp_pattern().captures(s).ok_or_else(|| {
            debug!("Rejected timestamp string {:?}", s);
            TimestampError::InvalidFormat(s.to_string())
        })?;

        let milliseconds = match caps.get(4) {
            Some(m) => parse_field(m.as_str(), s)?,
            None => 0,
        };

        Ok(Self {
            hours: parse_field(&caps[1], s)?,
            minutes: parse_field(&caps[2], s)?,
            seconds: parse_field(&caps[3], s)?,
            milliseconds,
        })
    }

    /// Builds a timestamp from decimal seconds using [`MinutesFormula::Legacy`].
    ///
    /// Negative, NaN, infinite and out-of-range input is clamped to zero.
    pub fn from_seconds(seconds: f64) -> Self {
        Self::from_seconds_with(seconds, MinutesFormula::Legacy)
    }

    /// Builds a timestamp from decimal seconds with the given minutes formula.
    ///
    /// The fractional part is rounded to the nearest millisecond of its exact
    /// binary value (`0.0045` is stored below the half and yields `004`); a
    /// fraction that rounds up to a full second carries into the seconds field.
    /// Negative, NaN, infinite and out-of-range input is clamped to zero.
    pub fn from_seconds_with(seconds: f64, formula: MinutesFormula) -> Self {
        if !is_valid_seconds(seconds) {
            warn!(
                "Timestamp created from invalid seconds value {}, clamping to zero",
                seconds
            );
            return Self::decompose(0, 0, formula);
        }

        let whole = seconds.trunc();
        let mut whole_seconds = whole as u64;
        let mut milliseconds = fraction_to_millis(seconds - whole);
        if milliseconds >= MILLIS_PER_SECOND {
            whole_seconds = whole_seconds.saturating_add(1);
            milliseconds -= MILLIS_PER_SECOND;
        }

        Self::decompose(whole_seconds, milliseconds as u16, formula)
    }

    /// Like [`Timestamp::from_seconds_with`], but rejects negative, NaN,
    /// infinite and out-of-range input instead of clamping it.
    pub fn try_from_seconds(seconds: f64, formula: MinutesFormula) -> TimestampResult<Self> {
        if !is_valid_seconds(seconds) {
            return Err(TimestampError::InvalidSeconds(seconds));
        }
        Ok(Self::from_seconds_with(seconds, formula))
    }

    /// Rebuilds a timestamp from an exact millisecond count
    pub(crate) fn from_total_milliseconds(total: u128, formula: MinutesFormula) -> Self {
        let millis_per_second = u128::from(MILLIS_PER_SECOND);
        let whole_seconds = u64::try_from(total / millis_per_second).unwrap_or(u64::MAX);
        Self::decompose(whole_seconds, (total % millis_per_second) as u16, formula)
    }

    fn decompose(whole_seconds: u64, milliseconds: u16, formula: MinutesFormula) -> Self {
        Self {
            hours: whole_seconds / SECONDS_PER_HOUR,
            minutes: formula.minutes(whole_seconds),
            seconds: (whole_seconds % SECONDS_PER_MINUTE) as u8,
            milliseconds,
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn hours(&self) -> u64 {
        self.hours
    }

    pub fn minutes(&self) -> u8 {
        self.minutes
    }

    pub fn seconds(&self) -> u8 {
        self.seconds
    }

    pub fn milliseconds(&self) -> u16 {
        self.milliseconds
    }

    /// Whole seconds, computed with integer arithmetic
    fn whole_seconds(&self) -> u128 {
        u128::from(self.hours) * u128::from(SECONDS_PER_HOUR)
            + u128::from(self.minutes) * u128::from(SECONDS_PER_MINUTE)
            + u128::from(self.seconds)
    }

    /// Total elapsed milliseconds
    pub fn total_milliseconds(&self) -> u128 {
        self.whole_seconds() * u128::from(MILLIS_PER_SECOND) + u128::from(self.milliseconds)
    }

    // -------------------------------------------------------------------------
    // Formatting
    // -------------------------------------------------------------------------

    /// Formats as `HH:MM:SS,mmm` when `for_srt` is true, `HH:MM:SS.mmm` otherwise.
    pub fn format(&self, for_srt: bool) -> String {
        let separator = if for_srt { ',' } else { '.' };
        format!(
            "{:02}:{:02}:{:02}{}{:03}",
            self.hours, self.minutes, self.seconds, separator, self.milliseconds
        )
    }

    /// Formats for SRT subtitle files: `HH:MM:SS,mmm`
    pub fn to_string_for_srt(&self) -> String {
        self.format(true)
    }

    /// Elapsed time in decimal seconds
    pub fn to_seconds(&self) -> f64 {
        self.whole_seconds() as f64 + f64::from(self.milliseconds) / MILLIS_PER_SECOND as f64
    }

    /// Elapsed time as `<whole seconds>.<mmm>`, e.g. `3702.460`.
    ///
    /// Computed without floating point, so it is safe to pass as the
    /// `start`/`end` option of FFmpeg's `trim` filter.
    pub fn to_seconds_string(&self) -> String {
        format!("{}.{:03}", self.whole_seconds(), self.milliseconds)
    }

    // -------------------------------------------------------------------------
    // Arithmetic
    // -------------------------------------------------------------------------

    /// Returns `self - other` using [`MinutesFormula::Legacy`].
    ///
    /// Fails with [`TimestampError::NegativeDuration`] when `self` is earlier
    /// than `other`. Equal timestamps yield `00:00:00.000`.
    pub fn subtract(&self, other: &Timestamp) -> TimestampResult<Self> {
        self.subtract_with(other, MinutesFormula::Legacy)
    }

    /// Returns `self - other`, rebuilding the result with the given formula.
    pub fn subtract_with(
        &self,
        other: &Timestamp,
        formula: MinutesFormula,
    ) -> TimestampResult<Self> {
        if self < other {
            debug!("Refusing to subtract {} from earlier {}", other, self);
            return Err(TimestampError::NegativeDuration {
                minuend: *self,
                subtrahend: *other,
            });
        }

        let difference = self.to_seconds() - other.to_seconds();
        Ok(Self::from_seconds_with(difference, formula))
    }
}

fn is_valid_seconds(seconds: f64) -> bool {
    seconds.is_finite() && seconds >= 0.0 && seconds < MAX_SECONDS
}

/// Rounds a fraction in `[0, 1)` to milliseconds, `1000` when it rounds up.
/// Rounding applies to the exact binary value, not to `fraction * 1000.0`.
fn fraction_to_millis(fraction: f64) -> u64 {
    let rendered = format!("{:.3}", fraction);
    match rendered.split_once('.') {
        Some(("1", _)) => MILLIS_PER_SECOND,
        Some((_, digits)) => digits.parse().unwrap_or(0),
        None => 0,
    }
}

fn parse_field<T: FromStr>(digits: &str, input: &str) -> TimestampResult<T> {
    digits
        .parse()
        .map_err(|_| TimestampError::InvalidFormat(input.to_string()))
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(false))
    }
}

impl FromStr for Timestamp {
    type Err = TimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Timestamp {
    type Error = TimestampError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<Timestamp> for Duration {
    fn from(ts: Timestamp) -> Self {
        let secs = u64::try_from(ts.whole_seconds()).unwrap_or(u64::MAX);
        Duration::new(secs, u32::from(ts.milliseconds) * 1_000_000)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    // -------------------------------------------------------------------------
    // Parsing Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_parse_without_milliseconds() {
        let t = ts("00:00:00");
        assert_eq!(t.to_string(), "00:00:00.000");
        assert_eq!(t.to_string_for_srt(), "00:00:00,000");
        assert_eq!(t.to_seconds_string(), "0.000");
    }

    #[test]
    fn test_parse_with_dot_separator() {
        let t = ts("10:20:30.500");
        assert_eq!(t.hours(), 10);
        assert_eq!(t.minutes(), 20);
        assert_eq!(t.seconds(), 30);
        assert_eq!(t.milliseconds(), 500);
        assert_eq!(t.to_string(), "10:20:30.500");
        assert_eq!(t.to_string_for_srt(), "10:20:30,500");
        assert_eq!(t.to_seconds_string(), "37230.500");
    }

    #[test]
    fn test_parse_with_comma_separator() {
        let t = ts("20:30:40,900");
        assert_eq!(t.to_string(), "20:30:40.900");
        assert_eq!(t.to_string_for_srt(), "20:30:40,900");
        assert_eq!(t.to_seconds_string(), "73840.900");
    }

    #[test]
    fn test_parse_accepts_any_two_digit_hour() {
        let t = ts("99:59:59,999");
        assert_eq!(t.to_string(), "99:59:59.999");
        assert_eq!(t.to_seconds_string(), "359999.999");
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        let rejected = [
            "25:61:00",
            "1:02:03",
            "00:60:00",
            "00:00:60",
            "100:00:00",
            "00:00",
            "00:00:00.5",
            "00:00:00.5000",
            "00:00:00;000",
            "00:00:00|000",
            "00:00:00.",
            " 00:00:00",
            "00:00:00\n",
            "0a:00:00",
            "\u{0661}\u{0662}:00:00",
            "",
        ];

        for input in rejected {
            let result = Timestamp::parse(input);
            assert_eq!(
                result,
                Err(TimestampError::InvalidFormat(input.to_string())),
                "expected {:?} to be rejected",
                input
            );
        }
    }

    #[test]
    fn test_from_str_and_try_from() {
        let a: Timestamp = "01:02:03.004".parse().unwrap();
        let b = Timestamp::try_from("01:02:03,004").unwrap();
        assert_eq!(a, b);
        assert!("garbage".parse::<Timestamp>().is_err());
    }

    // -------------------------------------------------------------------------
    // Formatting Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_parse_then_display_normalizes_separator() {
        let cases = [
            ("00:00:00", "00:00:00.000"),
            ("12:34:56", "12:34:56.000"),
            ("12:34:56.007", "12:34:56.007"),
            ("12:34:56,070", "12:34:56.070"),
        ];

        for (input, expected) in cases {
            assert_eq!(ts(input).to_string(), expected);
        }
    }

    #[test]
    fn test_srt_and_plain_differ_only_in_separator() {
        for input in ["00:00:00", "05:06:07.089", "23:59:59,999"] {
            let t = ts(input);
            assert_eq!(t.to_string().replace('.', ","), t.to_string_for_srt());
            assert_eq!(t.format(false), t.to_string());
            assert_eq!(t.format(true), t.to_string_for_srt());
        }
    }

    #[test]
    fn test_hours_render_wider_than_two_digits() {
        let t = Timestamp::from_seconds_with(360_000.0, MinutesFormula::Conventional);
        assert_eq!(t.to_string(), "100:00:00.000");
        assert_eq!(t.to_seconds_string(), "360000.000");
    }

    // -------------------------------------------------------------------------
    // From Seconds Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_from_seconds_reference_values() {
        let zero = Timestamp::from_seconds(0.0);
        assert_eq!(zero.to_string(), "00:00:00.000");
        assert_eq!(zero.to_seconds_string(), "0.000");

        let pi = Timestamp::from_seconds(3.14);
        assert_eq!(pi.to_string(), "00:00:03.140");
        assert_eq!(pi.to_string_for_srt(), "00:00:03,140");
        assert_eq!(pi.to_seconds_string(), "3.140");

        let t = Timestamp::from_seconds(3882.46);
        assert_eq!(t.to_string(), "01:01:42.460");
        assert_eq!(t.to_string_for_srt(), "01:01:42,460");
        assert_eq!(t.to_seconds_string(), "3702.460");
    }

    #[test]
    fn test_from_seconds_conventional_minutes() {
        let t = Timestamp::from_seconds_with(3882.46, MinutesFormula::Conventional);
        assert_eq!(t.to_string(), "01:04:42.460");
        assert_eq!(t.to_seconds_string(), "3882.460");
    }

    #[test]
    fn test_formulas_agree_below_one_hour() {
        for seconds in [0.0, 59.5, 61.25, 1799.999, 3599.0] {
            assert_eq!(
                Timestamp::from_seconds_with(seconds, MinutesFormula::Legacy),
                Timestamp::from_seconds_with(seconds, MinutesFormula::Conventional),
            );
        }
    }

    #[test]
    fn test_legacy_minutes_follow_hours() {
        let t = Timestamp::from_seconds(360_000.0);
        assert_eq!(t.to_string(), "100:40:00.000");
    }

    #[test]
    fn test_from_seconds_rounds_to_nearest_millisecond() {
        assert_eq!(Timestamp::from_seconds(1.0004).milliseconds(), 0);
        assert_eq!(Timestamp::from_seconds(1.0006).milliseconds(), 1);
        assert_eq!(Timestamp::from_seconds(0.1).to_string(), "00:00:00.100");
    }

    #[test]
    fn test_from_seconds_rounds_exact_value_near_half_millisecond() {
        // each literal is stored just below its half-millisecond boundary
        assert_eq!(Timestamp::from_seconds(0.0045).to_string(), "00:00:00.004");
        assert_eq!(Timestamp::from_seconds(0.0055).to_string(), "00:00:00.005");
        assert_eq!(Timestamp::from_seconds(0.0065).to_string(), "00:00:00.006");
    }

    #[test]
    fn test_from_seconds_matches_three_digit_formatting() {
        for k in 0..2000u32 {
            let seconds = f64::from(k) / 2000.0;
            let rendered = format!("{:.3}", seconds);
            let expected = if rendered == "1.000" {
                "00:00:01.000".to_string()
            } else {
                format!("00:00:00.{}", &rendered[2..])
            };
            assert_eq!(
                Timestamp::from_seconds(seconds).to_string(),
                expected,
                "seconds = {}",
                seconds
            );
        }
    }

    #[test]
    fn test_from_seconds_carries_rounded_fraction() {
        let t = Timestamp::from_seconds(1.9996);
        assert_eq!(t.to_string(), "00:00:02.000");
    }

    #[test]
    fn test_from_seconds_clamps_invalid_input() {
        for seconds in [-1.5, f64::NAN, f64::INFINITY, f64::NEG_INFINITY, 1e300, MAX_SECONDS] {
            assert_eq!(Timestamp::from_seconds(seconds).to_string(), "00:00:00.000");
        }
    }

    #[test]
    fn test_try_from_seconds_rejects_invalid_input() {
        let err = Timestamp::try_from_seconds(-0.5, MinutesFormula::Legacy).unwrap_err();
        assert_eq!(err, TimestampError::InvalidSeconds(-0.5));

        assert!(matches!(
            Timestamp::try_from_seconds(f64::NAN, MinutesFormula::Conventional),
            Err(TimestampError::InvalidSeconds(_))
        ));

        assert_eq!(
            Timestamp::try_from_seconds(1e300, MinutesFormula::Conventional),
            Err(TimestampError::InvalidSeconds(1e300))
        );

        let ok = Timestamp::try_from_seconds(3.14, MinutesFormula::Legacy).unwrap();
        assert_eq!(ok.to_string(), "00:00:03.140");
    }

    #[test]
    fn test_seconds_round_trip_is_lossy_with_legacy_formula() {
        let original = ts("01:30:00.250");
        assert_eq!(original.to_seconds(), 5400.25);

        let legacy = Timestamp::from_seconds(original.to_seconds());
        assert_eq!(legacy.to_string(), "01:01:00.250");

        let conventional =
            Timestamp::from_seconds_with(original.to_seconds(), MinutesFormula::Conventional);
        assert_eq!(conventional, original);
    }

    // -------------------------------------------------------------------------
    // Conversion Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_to_seconds() {
        assert_eq!(ts("00:00:00").to_seconds(), 0.0);
        assert_eq!(ts("10:20:30.500").to_seconds(), 37230.5);
        assert!((ts("20:30:40,900").to_seconds() - 73840.9).abs() < 1e-9);
    }

    #[test]
    fn test_total_milliseconds_and_duration() {
        let t = ts("01:00:01.250");
        assert_eq!(t.total_milliseconds(), 3_601_250);
        assert_eq!(Duration::from(t), Duration::from_millis(3_601_250));
    }

    #[test]
    fn test_ordering_is_chronological() {
        assert!(ts("00:00:59.999") < ts("00:01:00"));
        assert!(ts("01:00:00") > ts("00:59:59,999"));
        assert_eq!(ts("00:00:01.000"), ts("00:00:01,000"));
    }

    // -------------------------------------------------------------------------
    // Subtraction Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_subtract_small_values() {
        let diff = ts("00:00:10").subtract(&ts("00:00:03.140")).unwrap();
        assert_eq!(diff.to_string(), "00:00:06.860");
    }

    #[test]
    fn test_subtract_equal_timestamps_yields_zero() {
        let t = ts("12:00:00,001");
        assert_eq!(t.subtract(&t).unwrap().to_string(), "00:00:00.000");
    }

    #[test]
    fn test_subtract_rejects_negative_result() {
        let earlier = ts("00:00:01");
        let later = ts("00:00:01.001");
        let err = earlier.subtract(&later).unwrap_err();
        assert_eq!(
            err,
            TimestampError::NegativeDuration {
                minuend: earlier,
                subtrahend: later,
            }
        );
    }

    #[test]
    fn test_subtract_uses_selected_formula() {
        let end = ts("10:20:30.500");
        let start = ts("00:00:00");

        assert_eq!(end.subtract(&start).unwrap().to_string(), "10:10:30.500");
        assert_eq!(
            end.subtract_with(&start, MinutesFormula::Conventional)
                .unwrap()
                .to_string(),
            "10:20:30.500"
        );
    }

    #[test]
    fn test_subtract_matches_seconds_difference() {
        let pairs = [
            ("00:00:05.000", "00:00:01.999"),
            ("01:02:03.456", "00:59:59.999"),
            ("23:59:59,999", "00:00:00.001"),
            ("05:00:00", "04:59:59.999"),
        ];

        for (a, b) in pairs {
            let (a, b) = (ts(a), ts(b));
            let diff = a.subtract_with(&b, MinutesFormula::Conventional).unwrap();
            let expected = a.to_seconds() - b.to_seconds();
            assert!(
                (diff.to_seconds() - expected).abs() < 0.0006,
                "{} - {} = {}",
                a,
                b,
                diff
            );
        }
    }

    // -------------------------------------------------------------------------
    // Serialization Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_serde_uses_string_form() {
        let t = ts("20:30:40,900");
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, "\"20:30:40.900\"");

        let back: Timestamp = serde_json::from_str("\"20:30:40,900\"").unwrap();
        assert_eq!(back, t);

        assert!(serde_json::from_str::<Timestamp>("\"25:61:00\"").is_err());
    }

    #[test]
    fn test_minutes_formula_serialization() {
        assert_eq!(
            serde_json::to_string(&MinutesFormula::Conventional).unwrap(),
            "\"conventional\""
        );
        assert_eq!(MinutesFormula::default(), MinutesFormula::Legacy);
        assert_eq!(MinutesFormula::Legacy.to_string(), "legacy");
    }
}
