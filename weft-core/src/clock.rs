use chrono::offset::LocalResult;
use chrono::{NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::record::TimePoint;
use crate::source::RawClock;
use crate::WeftError;

/// Wall-clock format accepted by default: calendar date, time of day, and an
/// optional fractional-seconds tail (`2026-02-17 13:32:30.000125`).
pub const DEFAULT_WALL_CLOCK_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

const MICROS_PER_SEC: f64 = 1_000_000.0;

/// Configuration for timestamp normalization.
///
/// One spec describes how a single stream's raw clock fields map into the
/// epoch-seconds domain. Streams with different representations (wall clock
/// vs. relative offset) use different specs; the quantization interval should
/// be shared across both sides of a join so quantized values stay comparable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockSpec {
    /// `strftime`-style format for the combined `"{date} {time}"` field pair.
    pub format: String,
    /// Timezone the wall-clock fields are expressed in. `None` means UTC.
    pub timezone: Option<chrono_tz::Tz>,
    /// Absolute epoch the stream's relative offsets are measured from.
    /// Required for offset-based streams; unused for wall-clock streams.
    pub reference_epoch: Option<TimePoint>,
    /// Grid interval in seconds for quantization. `0` disables quantization.
    pub quantization_interval: f64,
}

impl Default for ClockSpec {
    fn default() -> Self {
        Self {
            format: DEFAULT_WALL_CLOCK_FORMAT.to_string(),
            timezone: None,
            reference_epoch: None,
            quantization_interval: 0.0,
        }
    }
}

/// Converts raw clock fields into [`TimePoint`]s.
///
/// Pure and side-effect free: the same input always produces the same output,
/// and quantization is a fixed point (applying it twice returns the same
/// value as applying it once).
#[derive(Debug, Clone)]
pub struct TimeNormalizer {
    spec: ClockSpec,
}

impl TimeNormalizer {
    /// Validate a spec and build a normalizer from it.
    ///
    /// # Errors
    /// Returns `WeftError::InvalidArg` if the quantization interval is
    /// negative or non-finite, or if the reference epoch is non-finite.
    pub fn new(spec: ClockSpec) -> Result<Self, WeftError> {
        if !spec.quantization_interval.is_finite() || spec.quantization_interval < 0.0 {
            return Err(WeftError::invalid(format!(
                "quantization interval must be finite and non-negative, got {}",
                spec.quantization_interval
            )));
        }
        if let Some(epoch) = spec.reference_epoch
            && !epoch.is_finite()
        {
            return Err(WeftError::invalid(format!(
                "reference epoch must be finite, got {epoch}"
            )));
        }
        Ok(Self { spec })
    }

    /// The spec this normalizer was built from.
    #[must_use]
    pub const fn spec(&self) -> &ClockSpec {
        &self.spec
    }

    /// Normalize a calendar date + time-of-day pair into quantized epoch
    /// seconds.
    ///
    /// The pair is parsed as `"{date} {time}"` against the configured format
    /// and resolved in the configured timezone (UTC when unset). Across a
    /// fall-back overlap the earlier instant is chosen; a wall-clock value
    /// inside a spring-forward gap does not exist and is rejected.
    ///
    /// # Errors
    /// Returns `WeftError::MalformedTimestamp` when the pair cannot be parsed
    /// or cannot be resolved to an instant.
    pub fn wall_clock(&self, date: &str, time: &str) -> Result<TimePoint, WeftError> {
        let combined = format!("{date} {time}");
        let naive = NaiveDateTime::parse_from_str(&combined, &self.spec.format)
            .map_err(|e| WeftError::malformed(&combined, e.to_string()))?;
        let micros = match self.spec.timezone {
            None => naive.and_utc().timestamp_micros(),
            Some(tz) => match tz.from_local_datetime(&naive) {
                LocalResult::Single(dt) => dt.with_timezone(&Utc).timestamp_micros(),
                LocalResult::Ambiguous(dt1, _) => dt1.with_timezone(&Utc).timestamp_micros(),
                LocalResult::None => {
                    return Err(WeftError::malformed(
                        &combined,
                        format!("wall-clock value does not exist in timezone {tz}"),
                    ));
                }
            },
        };
        #[allow(clippy::cast_precision_loss)]
        let seconds = micros as f64 / MICROS_PER_SEC;
        Ok(self.quantize(seconds))
    }

    /// Normalize a relative offset in seconds into quantized epoch seconds by
    /// adding it to the configured reference epoch.
    ///
    /// # Errors
    /// Returns `WeftError::InvalidArg` when no reference epoch is configured,
    /// and `WeftError::MalformedTimestamp` when the offset is non-finite.
    pub fn offset(&self, seconds: f64) -> Result<TimePoint, WeftError> {
        let Some(reference) = self.spec.reference_epoch else {
            return Err(WeftError::invalid(
                "offset-based timestamps require a reference epoch",
            ));
        };
        if !seconds.is_finite() {
            return Err(WeftError::malformed(
                seconds.to_string(),
                "offset is not a finite number of seconds",
            ));
        }
        Ok(self.quantize(reference + seconds))
    }

    /// Normalize either raw clock representation.
    ///
    /// # Errors
    /// Propagates the errors of [`Self::wall_clock`] and [`Self::offset`].
    pub fn resolve(&self, clock: &RawClock) -> Result<TimePoint, WeftError> {
        match clock {
            RawClock::WallClock { date, time } => self.wall_clock(date, time),
            RawClock::Offset(seconds) => self.offset(*seconds),
        }
    }

    /// Round a timestamp to the nearest multiple of the configured interval.
    ///
    /// Dampens sub-interval jitter between independently clocked sources
    /// before comparison. Identity when the interval is `0`.
    #[must_use]
    pub fn quantize(&self, t: TimePoint) -> TimePoint {
        let interval = self.spec.quantization_interval;
        if interval > 0.0 {
            (t / interval).round() * interval
        } else {
            t
        }
    }
}
