//! Calendar aware temporal bins.
//!
//! Values are milliseconds since the unix epoch. Stepping happens on the
//! wall clock of the range's timezone and the result is converted back to
//! an instant, so bins follow calendar boundaries across DST changes and
//! months of different length.

use binviz_common::descriptor::TemporalGranularity;
use chrono::{DateTime, Duration, Months, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::bin_range::MAX_BIN_COUNT;
use crate::error::BinvizScaleError;

/// Parse timezone string to chrono_tz::Tz
pub fn parse_timezone(tz_str: &str) -> Result<Tz, BinvizScaleError> {
    match tz_str {
        "UTC" | "utc" | "" => Ok(Tz::UTC),
        tz => tz
            .parse::<Tz>()
            .map_err(|_| BinvizScaleError::InvalidTimezone(tz.to_string())),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemporalBinRange {
    pub min: f64,
    pub max: f64,
    pub step: i32,
    pub granularity: TemporalGranularity,
    pub tz: Tz,
}

impl TemporalBinRange {
    pub fn new(
        min: f64,
        max: f64,
        step: i32,
        granularity: TemporalGranularity,
        timezone: Option<&str>,
    ) -> Result<Self, BinvizScaleError> {
        let tz = parse_timezone(timezone.unwrap_or("UTC"))?;
        if !min.is_finite() {
            return Err(BinvizScaleError::InvalidTimestamp(min));
        }
        if !max.is_finite() {
            return Err(BinvizScaleError::InvalidTimestamp(max));
        }
        Ok(Self {
            min: min.round(),
            max: max.round(),
            step: step.max(1),
            granularity,
            tz,
        })
    }

    /// Instant of `value` on this range's wall clock
    pub fn to_datetime(&self, value: f64) -> Option<DateTime<Tz>> {
        Utc.timestamp_millis_opt(value.round() as i64)
            .single()
            .map(|dt| dt.with_timezone(&self.tz))
    }

    fn to_value(dt: &DateTime<Tz>) -> f64 {
        dt.timestamp_millis() as f64
    }

    /// Resolves a wall clock time, moving times inside a DST gap forward
    fn localize(&self, naive: NaiveDateTime) -> DateTime<Tz> {
        self.tz
            .from_local_datetime(&naive)
            .earliest()
            .or_else(|| {
                let shifted = naive.checked_add_signed(Duration::hours(1))?;
                self.tz.from_local_datetime(&shifted).earliest()
            })
            .unwrap_or_else(|| self.tz.from_utc_datetime(&naive))
    }

    /// Moves `dt` by `count` steps of the granularity. `None` when the
    /// result leaves the representable range.
    fn offset(&self, dt: DateTime<Tz>, count: i64) -> Option<DateTime<Tz>> {
        let naive = dt.naive_local();
        match self.granularity {
            TemporalGranularity::Second => dt.checked_add_signed(Duration::try_seconds(count)?),
            TemporalGranularity::Minute => dt.checked_add_signed(Duration::try_minutes(count)?),
            TemporalGranularity::Hour => dt.checked_add_signed(Duration::try_hours(count)?),
            TemporalGranularity::Day => naive
                .checked_add_signed(Duration::try_days(count)?)
                .map(|n| self.localize(n)),
            TemporalGranularity::Week => naive
                .checked_add_signed(Duration::try_weeks(count)?)
                .map(|n| self.localize(n)),
            TemporalGranularity::Month => self.add_months(naive, count),
            TemporalGranularity::Year => self.add_months(naive, count.checked_mul(12)?),
        }
    }

    // Days past the end of the target month clamp to its last day,
    // e.g. Jan 31 + 1 month = Feb 29 in a leap year.
    fn add_months(&self, naive: NaiveDateTime, months: i64) -> Option<DateTime<Tz>> {
        let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
        let shifted = if months >= 0 {
            naive.checked_add_months(magnitude)
        } else {
            naive.checked_sub_months(magnitude)
        };
        shifted.map(|n| self.localize(n))
    }

    /// Value one step after `value`
    pub fn add_step(&self, value: f64) -> f64 {
        self.step_by(value, 1)
    }

    fn step_by(&self, value: f64, steps: i64) -> f64 {
        self.to_datetime(value)
            .and_then(|dt| self.offset(dt, steps * self.step as i64))
            .map(|dt| Self::to_value(&dt))
            .unwrap_or(value)
    }

    /// Start of bin `index`, reached by stepping from `min` one bin at a time
    /// so that clamped month ends carry forward exactly like `add_step`
    pub fn value_from_index(&self, index: i64) -> f64 {
        let direction = index.signum();
        let mut value = self.min;
        for _ in 0..index.unsigned_abs().min(MAX_BIN_COUNT as u64) {
            value = self.step_by(value, direction);
        }
        value
    }

    pub fn bins(&self) -> Vec<f64> {
        let mut bins = Vec::new();
        let mut value = self.min;
        while value < self.max && bins.len() < MAX_BIN_COUNT {
            bins.push(value);
            let next = self.add_step(value);
            if next <= value {
                tracing::warn!("temporal bin range stopped advancing at {value}");
                break;
            }
            value = next;
        }
        if bins.is_empty() {
            bins.push(self.min);
        }
        bins
    }

    pub fn index_of(&self, value: f64) -> i64 {
        if value < self.min {
            return -1;
        }
        let mut index = 0;
        let mut start = self.min;
        while (index as usize) < MAX_BIN_COUNT {
            let next = self.add_step(start);
            if value < next || next <= start {
                break;
            }
            start = next;
            index += 1;
        }
        index
    }

    pub fn label(&self, value: f64) -> String {
        let Some(dt) = self.to_datetime(value) else {
            return String::new();
        };
        let format = match self.granularity {
            TemporalGranularity::Year => "%Y",
            TemporalGranularity::Month => "%b %Y",
            TemporalGranularity::Week | TemporalGranularity::Day => "%Y-%m-%d",
            TemporalGranularity::Hour => "%Y-%m-%d %H:00",
            TemporalGranularity::Minute => "%Y-%m-%d %H:%M",
            TemporalGranularity::Second => "%H:%M:%S",
        };
        dt.format(format).to_string()
    }
}
