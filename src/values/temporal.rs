use std::fmt;

use time::{Date, Duration, Month, OffsetDateTime, PrimitiveDateTime, UtcOffset};

use super::{DurationValue, Value};
use crate::error::{CypherError, Result};

const NANOS_PER_SECOND: i64 = 1_000_000_000;
const SECONDS_PER_DAY: i64 = 86_400;

/// Time of day carrying a UTC offset.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TimeValue {
    /// Local time of day.
    pub time: time::Time,
    /// Offset from UTC.
    pub offset: UtcOffset,
}

impl TimeValue {
    /// Creates a time with offset.
    pub fn new(time: time::Time, offset: UtcOffset) -> Self {
        Self { time, offset }
    }

    /// Nanoseconds since midnight UTC, not wrapped into a single day.
    ///
    /// Two values denote the same instant exactly when these are equal.
    pub fn utc_nanos(&self) -> i64 {
        nanos_of_day(self.time) - self.offset.whole_seconds() as i64 * NANOS_PER_SECOND
    }
}

impl fmt::Display for TimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", format_time(self.time), format_offset(self.offset))
    }
}

/// `HH:MM:SS` with a trimmed fractional part when nanoseconds are set.
pub fn format_time(t: time::Time) -> String {
    let mut out = format!("{:02}:{:02}:{:02}", t.hour(), t.minute(), t.second());
    if t.nanosecond() != 0 {
        let fraction = format!("{:09}", t.nanosecond());
        out.push('.');
        out.push_str(fraction.trim_end_matches('0'));
    }
    out
}

/// `Z` for UTC, otherwise `+HH:MM` (with `:SS` when needed).
pub fn format_offset(offset: UtcOffset) -> String {
    if offset.is_utc() {
        return "Z".to_string();
    }
    let total = offset.whole_seconds();
    let sign = if total < 0 { '-' } else { '+' };
    let abs = total.unsigned_abs();
    let (h, m, s) = (abs / 3600, (abs / 60) % 60, abs % 60);
    if s == 0 {
        format!("{sign}{h:02}:{m:02}")
    } else {
        format!("{sign}{h:02}:{m:02}:{s:02}")
    }
}

pub(crate) fn nanos_of_day(t: time::Time) -> i64 {
    (t.hour() as i64 * 3600 + t.minute() as i64 * 60 + t.second() as i64) * NANOS_PER_SECOND
        + t.nanosecond() as i64
}

fn overflow() -> CypherError {
    CypherError::overflow("temporal arithmetic")
}

fn add_months(date: Date, months: i64) -> Result<Date> {
    if months == 0 {
        return Ok(date);
    }
    let current = date.year() as i64 * 12 + (u8::from(date.month()) as i64 - 1);
    let total = current.checked_add(months).ok_or_else(overflow)?;
    let year = i32::try_from(total.div_euclid(12)).map_err(|_| overflow())?;
    let month = Month::try_from((total.rem_euclid(12) + 1) as u8).map_err(|_| overflow())?;
    let day = date.day().min(time::util::days_in_year_month(year, month));
    Date::from_calendar_date(year, month, day).map_err(|_| overflow())
}

/// Whole days plus the sub-day part of a duration, as one [`time::Duration`].
fn day_time_span(duration: &DurationValue) -> Result<Duration> {
    let day_seconds = duration
        .days()
        .checked_mul(SECONDS_PER_DAY)
        .ok_or_else(overflow)?;
    let seconds = day_seconds
        .checked_add(duration.seconds())
        .ok_or_else(overflow)?;
    Duration::seconds(seconds)
        .checked_add(Duration::nanoseconds(duration.nanos() as i64))
        .ok_or_else(overflow)
}

fn time_of_day_span(duration: &DurationValue) -> Duration {
    Duration::seconds(duration.seconds() % SECONDS_PER_DAY)
        + Duration::nanoseconds(duration.nanos() as i64)
}

fn date_plus(date: Date, duration: &DurationValue) -> Result<Date> {
    let shifted = add_months(date, duration.months())?;
    let days = duration
        .days()
        .checked_add(duration.seconds() / SECONDS_PER_DAY)
        .ok_or_else(overflow)?;
    let seconds = days.checked_mul(SECONDS_PER_DAY).ok_or_else(overflow)?;
    shifted
        .checked_add(Duration::seconds(seconds))
        .ok_or_else(overflow)
}

fn local_date_time_plus(dt: PrimitiveDateTime, duration: &DurationValue) -> Result<PrimitiveDateTime> {
    let date = add_months(dt.date(), duration.months())?;
    PrimitiveDateTime::new(date, dt.time())
        .checked_add(day_time_span(duration)?)
        .ok_or_else(overflow)
}

fn date_time_plus(dt: OffsetDateTime, duration: &DurationValue) -> Result<OffsetDateTime> {
    let date = add_months(dt.date(), duration.months())?;
    dt.replace_date(date)
        .checked_add(day_time_span(duration)?)
        .ok_or_else(overflow)
}

/// Adds a duration to a temporal value.
///
/// Months are applied first and clamp to the last valid day of the target
/// month. Dates ignore the sub-day part beyond whole days; times of day wrap
/// around midnight.
pub(crate) fn plus_duration(temporal: &Value, duration: &DurationValue) -> Result<Value> {
    Ok(match temporal {
        Value::Date(d) => Value::Date(date_plus(*d, duration)?),
        Value::LocalTime(t) => Value::LocalTime(*t + time_of_day_span(duration)),
        Value::Time(t) => Value::Time(TimeValue::new(t.time + time_of_day_span(duration), t.offset)),
        Value::LocalDateTime(dt) => Value::LocalDateTime(local_date_time_plus(*dt, duration)?),
        Value::DateTime(dt) => Value::DateTime(date_time_plus(*dt, duration)?),
        other => {
            return Err(CypherError::type_error(format!(
                "expected a temporal value but got {other}"
            )))
        }
    })
}

fn date_of(value: &Value) -> Option<Date> {
    match value {
        Value::Date(d) => Some(*d),
        Value::DateTime(dt) => Some(dt.date()),
        Value::LocalDateTime(dt) => Some(dt.date()),
        _ => None,
    }
}

fn time_of(value: &Value) -> Option<time::Time> {
    match value {
        Value::Time(t) => Some(t.time),
        Value::LocalTime(t) => Some(*t),
        Value::DateTime(dt) => Some(dt.time()),
        Value::LocalDateTime(dt) => Some(dt.time()),
        _ => None,
    }
}

fn offset_of(value: &Value) -> Option<UtcOffset> {
    match value {
        Value::Time(t) => Some(t.offset),
        Value::DateTime(dt) => Some(dt.offset()),
        _ => None,
    }
}

fn date_field(date: Date, field: &str) -> Option<i64> {
    let month = u8::from(date.month()) as i64;
    let quarter = (month - 1) / 3 + 1;
    Some(match field {
        "year" => date.year() as i64,
        "quarter" => quarter,
        "month" => month,
        "week" => date.iso_week() as i64,
        "weekyear" => date.to_iso_week_date().0 as i64,
        "day" => date.day() as i64,
        "ordinalday" => date.ordinal() as i64,
        "dayofweek" | "weekday" => date.weekday().number_from_monday() as i64,
        "dayofquarter" => {
            let start_month = Month::try_from(((quarter - 1) * 3 + 1) as u8).ok()?;
            let start = Date::from_calendar_date(date.year(), start_month, 1).ok()?;
            (date - start).whole_days() + 1
        }
        _ => return None,
    })
}

fn time_field(t: time::Time, field: &str) -> Option<i64> {
    Some(match field {
        "hour" => t.hour() as i64,
        "minute" => t.minute() as i64,
        "second" => t.second() as i64,
        "millisecond" => t.nanosecond() as i64 / 1_000_000,
        "microsecond" => t.nanosecond() as i64 / 1_000,
        "nanosecond" => t.nanosecond() as i64,
        _ => return None,
    })
}

/// Reads a named component (`year`, `hour`, `offsetMinutes`, ...) of a temporal value.
///
/// Field names are case-insensitive; an unsupported field is an argument error.
pub(crate) fn temporal_field(value: &Value, field: &str) -> Result<Value> {
    let key = field.to_ascii_lowercase();
    if let Some(v) = date_of(value).and_then(|d| date_field(d, &key)) {
        return Ok(Value::Integer(v));
    }
    if let Some(v) = time_of(value).and_then(|t| time_field(t, &key)) {
        return Ok(Value::Integer(v));
    }
    if let Some(offset) = offset_of(value) {
        match key.as_str() {
            "timezone" | "offset" => return Ok(Value::text(format_offset(offset))),
            "offsetminutes" => return Ok(Value::Integer(offset.whole_minutes() as i64)),
            "offsetseconds" => return Ok(Value::Integer(offset.whole_seconds() as i64)),
            _ => {}
        }
    }
    if let Value::DateTime(dt) = value {
        match key.as_str() {
            "epochseconds" => return Ok(Value::Integer(dt.unix_timestamp())),
            "epochmillis" => {
                return Ok(Value::Integer((dt.unix_timestamp_nanos() / 1_000_000) as i64))
            }
            _ => {}
        }
    }
    Err(CypherError::invalid_argument(format!(
        "No such field: {field} on {}",
        value.type_name()
    )))
}
