use std::fmt;

use super::Value;
use crate::error::{CypherError, Result};

const NANOS_PER_SECOND: i128 = 1_000_000_000;
const SECONDS_PER_DAY: f64 = 86_400.0;
/// 30.436875 days: the mean Gregorian month.
const AVERAGE_SECONDS_PER_MONTH: f64 = 2_629_746.0;

/// Calendar-aware amount of time.
///
/// Months, days and seconds are kept apart because their lengths vary.
/// Seconds and nanoseconds are normalised so `nanos` always carries the sign
/// of `seconds` and stays below one second in magnitude.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct DurationValue {
    months: i64,
    days: i64,
    seconds: i64,
    nanos: i32,
}

impl DurationValue {
    /// Builds a normalised duration.
    pub fn new(months: i64, days: i64, seconds: i64, nanos: i64) -> Result<Self> {
        let total = seconds as i128 * NANOS_PER_SECOND + nanos as i128;
        let seconds = i64::try_from(total / NANOS_PER_SECOND)
            .map_err(|_| CypherError::overflow("duration"))?;
        let nanos = (total % NANOS_PER_SECOND) as i32;
        Ok(Self {
            months,
            days,
            seconds,
            nanos,
        })
    }

    /// Months component.
    pub fn months(&self) -> i64 {
        self.months
    }

    /// Days component.
    pub fn days(&self) -> i64 {
        self.days
    }

    /// Seconds component.
    pub fn seconds(&self) -> i64 {
        self.seconds
    }

    /// Sub-second nanoseconds, same sign as [`DurationValue::seconds`].
    pub fn nanos(&self) -> i32 {
        self.nanos
    }

    /// Component-wise sum.
    pub fn checked_add(&self, other: &DurationValue) -> Result<Self> {
        let overflow = || CypherError::overflow("duration addition");
        Self::new(
            self.months.checked_add(other.months).ok_or_else(overflow)?,
            self.days.checked_add(other.days).ok_or_else(overflow)?,
            self.seconds.checked_add(other.seconds).ok_or_else(overflow)?,
            self.nanos as i64 + other.nanos as i64,
        )
    }

    /// Component-wise negation.
    pub fn checked_neg(&self) -> Result<Self> {
        let overflow = || CypherError::overflow("duration negation");
        Self::new(
            self.months.checked_neg().ok_or_else(overflow)?,
            self.days.checked_neg().ok_or_else(overflow)?,
            self.seconds.checked_neg().ok_or_else(overflow)?,
            -(self.nanos as i64),
        )
    }

    /// Component-wise difference.
    pub fn checked_sub(&self, other: &DurationValue) -> Result<Self> {
        self.checked_add(&other.checked_neg()?)
    }

    /// Multiplies by a number. Integer factors scale each component exactly;
    /// fractional factors spill into smaller units.
    pub fn mul(&self, factor: &Value) -> Result<Self> {
        match factor {
            Value::Integer(n) => {
                let overflow = || CypherError::overflow("duration multiplication");
                let total_nanos = (self.seconds as i128 * NANOS_PER_SECOND + self.nanos as i128)
                    .checked_mul(*n as i128)
                    .ok_or_else(overflow)?;
                let seconds = i64::try_from(total_nanos / NANOS_PER_SECOND).map_err(|_| overflow())?;
                Self::new(
                    self.months.checked_mul(*n).ok_or_else(overflow)?,
                    self.days.checked_mul(*n).ok_or_else(overflow)?,
                    seconds,
                    (total_nanos % NANOS_PER_SECOND) as i64,
                )
            }
            Value::Float(f) => Self::approximate(
                self.months as f64 * f,
                self.days as f64 * f,
                self.seconds as f64 * f,
                self.nanos as f64 * f,
            ),
            other => Err(CypherError::type_error(format!(
                "cannot multiply a duration by {other}"
            ))),
        }
    }

    /// Divides by a non-zero number.
    pub fn div(&self, divisor: &Value) -> Result<Self> {
        let d = match divisor {
            Value::Integer(n) => *n as f64,
            Value::Float(f) => *f,
            other => {
                return Err(CypherError::type_error(format!(
                    "cannot divide a duration by {other}"
                )))
            }
        };
        if d == 0.0 {
            return Err(CypherError::division_by_zero());
        }
        Self::approximate(
            self.months as f64 / d,
            self.days as f64 / d,
            self.seconds as f64 / d,
            self.nanos as f64 / d,
        )
    }

    /// Builds a duration from fractional components, carrying each fraction
    /// into the next smaller unit.
    fn approximate(months: f64, days: f64, seconds: f64, nanos: f64) -> Result<Self> {
        let months_whole = to_i64(months)?;
        let days = days + (months - months_whole as f64) * AVERAGE_SECONDS_PER_MONTH / SECONDS_PER_DAY;
        let days_whole = to_i64(days)?;
        let seconds = seconds + (days - days_whole as f64) * SECONDS_PER_DAY;
        let seconds_whole = to_i64(seconds)?;
        let nanos = nanos + (seconds - seconds_whole as f64) * NANOS_PER_SECOND as f64;
        Self::new(months_whole, days_whole, seconds_whole, to_i64(nanos.round())?)
    }

    /// Reads a named component (`years`, `minutesOfHour`, ...), case-insensitively.
    pub fn field(&self, name: &str) -> Result<Value> {
        let nanos = self.nanos as i64;
        let value = match name.to_ascii_lowercase().as_str() {
            "years" => self.months / 12,
            "quarters" => self.months / 3,
            "months" => self.months,
            "weeks" => self.days / 7,
            "days" => self.days,
            "hours" => self.seconds / 3600,
            "minutes" => self.seconds / 60,
            "seconds" => self.seconds,
            "milliseconds" => self.seconds.saturating_mul(1_000).saturating_add(nanos / 1_000_000),
            "microseconds" => self.seconds.saturating_mul(1_000_000).saturating_add(nanos / 1_000),
            "nanoseconds" => self.seconds.saturating_mul(1_000_000_000).saturating_add(nanos),
            "quartersofyear" => (self.months / 3) % 4,
            "monthsofquarter" => self.months % 3,
            "monthsofyear" => self.months % 12,
            "daysofweek" => self.days % 7,
            "minutesofhour" => (self.seconds / 60) % 60,
            "secondsofminute" => self.seconds % 60,
            "millisecondsofsecond" => nanos / 1_000_000,
            "microsecondsofsecond" => nanos / 1_000,
            "nanosecondsofsecond" => nanos,
            _ => {
                return Err(CypherError::invalid_argument(format!(
                    "No such field: {name} on Duration"
                )))
            }
        };
        Ok(Value::Integer(value))
    }
}

fn to_i64(value: f64) -> Result<i64> {
    if value.is_finite() && value >= i64::MIN as f64 && value < i64::MAX as f64 {
        Ok(value as i64)
    } else {
        Err(CypherError::overflow("duration"))
    }
}

impl fmt::Display for DurationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.months == 0 && self.days == 0 && self.seconds == 0 && self.nanos == 0 {
            return write!(f, "PT0S");
        }
        write!(f, "P")?;
        let (years, months) = (self.months / 12, self.months % 12);
        if years != 0 {
            write!(f, "{years}Y")?;
        }
        if months != 0 {
            write!(f, "{months}M")?;
        }
        if self.days != 0 {
            write!(f, "{}D", self.days)?;
        }
        if self.seconds != 0 || self.nanos != 0 {
            write!(f, "T")?;
            let hours = self.seconds / 3600;
            let minutes = (self.seconds / 60) % 60;
            let seconds = self.seconds % 60;
            if hours != 0 {
                write!(f, "{hours}H")?;
            }
            if minutes != 0 {
                write!(f, "{minutes}M")?;
            }
            if seconds != 0 || self.nanos != 0 {
                if self.nanos == 0 {
                    write!(f, "{seconds}S")?;
                } else {
                    let negative = seconds < 0 || self.nanos < 0;
                    let fraction = format!("{:09}", self.nanos.unsigned_abs());
                    write!(
                        f,
                        "{}{}.{}S",
                        if negative { "-" } else { "" },
                        seconds.unsigned_abs(),
                        fraction.trim_end_matches('0')
                    )?;
                }
            }
        }
        Ok(())
    }
}
