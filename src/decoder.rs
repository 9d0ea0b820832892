//! Row decoding for SUNA log files.
//!
//! Converts one delimited data line into a [`Record`]: the packed YYYYDDD
//! date and decimal hour become a timestamp shifted by the configured UTC
//! offset, and every other field is coerced to a float by layout position.

use crate::constants::{
    FALLBACK_DATE, FIELD_DELIMITER, HOUR_OF_DAY_MAX, HOUR_OF_DAY_MIN, PACKED_DATE_YEAR_FACTOR,
};
use crate::error::{Result, SunaError};
use crate::header::LayoutVersion;
use crate::models::{Record, SkipReason};
use chrono::{NaiveDate, NaiveTime, TimeDelta};
use tracing::trace;

/// Fields of one data line with the leading identifier already removed
#[derive(Debug, Clone)]
pub struct RawRow<'a> {
    /// 1-based line number in the source file
    pub line: usize,
    pub fields: Vec<&'a str>,
}

impl<'a> RawRow<'a> {
    /// Split a data line and drop the instrument/serial identifier field
    pub fn from_line(line: usize, text: &'a str) -> Self {
        let fields = text.split(FIELD_DELIMITER).skip(1).collect();
        Self { line, fields }
    }
}

/// Outcome of decoding a well-formed row
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Record(Record),
    Skipped(SkipReason),
}

/// Decodes raw rows for one layout and UTC offset
#[derive(Debug, Clone)]
pub struct RecordDecoder {
    version: LayoutVersion,
    offset: TimeDelta,
}

impl RecordDecoder {
    pub fn new(version: LayoutVersion, utc_offset_hours: f64) -> Result<Self> {
        let offset = utc_offset(utc_offset_hours)?;
        Ok(Self { version, offset })
    }

    pub fn version(&self) -> LayoutVersion {
        self.version
    }

    pub fn decode(&self, row: &RawRow<'_>) -> Result<Decoded> {
        let expected = self.version.field_count();
        if row.fields.len() != expected {
            return Err(SunaError::malformed(
                row.line,
                format!("expected {} fields, found {}", expected, row.fields.len()),
            ));
        }

        let packed = parse_required(row, 0, "packed date", self.version.date_column())?;
        let hours = parse_required(row, 1, "decimal hour", self.version.time_column())?;

        if !(hours > HOUR_OF_DAY_MIN && hours < HOUR_OF_DAY_MAX) {
            trace!("Line {}: hour {} outside (0, 24), skipping", row.line, hours);
            return Ok(Decoded::Skipped(SkipReason::HourOutOfRange));
        }

        if !packed.is_finite() || packed < 0.0 {
            return Err(SunaError::malformed(
                row.line,
                format!("invalid packed date {}", packed),
            ));
        }
        let packed = packed.trunc() as i64;

        let date = if packed == 0 {
            fallback_date()
        } else if packed / PACKED_DATE_YEAR_FACTOR == 0 {
            trace!("Line {}: packed date {} has no year, skipping", row.line, packed);
            return Ok(Decoded::Skipped(SkipReason::UndatedYear));
        } else {
            decode_packed_date(packed).ok_or_else(|| {
                SunaError::malformed(row.line, format!("packed date {} out of range", packed))
            })?
        };

        let time = decode_decimal_hour(hours).ok_or_else(|| {
            SunaError::malformed(row.line, format!("decimal hour {} not convertible", hours))
        })?;

        let timestamp = date
            .and_time(time)
            .checked_add_signed(self.offset)
            .ok_or_else(|| SunaError::malformed(row.line, "timestamp overflow after UTC offset"))?;

        let values = row.fields[2..]
            .iter()
            .enumerate()
            .map(|(i, field)| {
                parse_numeric(field).map_err(|reason| {
                    SunaError::malformed(row.line, format!("column {}: {}", i + 2, reason))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Decoded::Record(Record { timestamp, values }))
    }
}

/// Calendar date for a packed `YYYYDDD` value: January 1 of the year plus
/// `DDD - 1` days. Days past the end of the year roll into the next one, and
/// day 0 resolves to December 31 of the previous year.
pub fn decode_packed_date(packed: i64) -> Option<NaiveDate> {
    let year = i32::try_from(packed / PACKED_DATE_YEAR_FACTOR).ok()?;
    let day_of_year = packed % PACKED_DATE_YEAR_FACTOR;
    let start = NaiveDate::from_ymd_opt(year, 1, 1)?;
    start.checked_add_signed(TimeDelta::try_days(day_of_year - 1)?)
}

/// Time of day for a decimal hour, truncating each component.
pub fn decode_decimal_hour(hours: f64) -> Option<NaiveTime> {
    let minutes = hours * 60.0;
    let seconds = minutes * 60.0;
    let h = hours.floor();
    let m = (minutes % 60.0).floor();
    let s = (seconds % 60.0).floor();
    if !(h >= 0.0 && m >= 0.0 && s >= 0.0) {
        return None;
    }
    NaiveTime::from_hms_opt(h as u32, m as u32, s as u32)
}

/// Timestamp assigned to rows whose packed date is zero
pub fn fallback_date() -> NaiveDate {
    let (year, month, day) = FALLBACK_DATE;
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

fn utc_offset(hours: f64) -> Result<TimeDelta> {
    if !hours.is_finite() {
        return Err(SunaError::configuration(format!(
            "UTC offset must be finite, got {}",
            hours
        )));
    }
    TimeDelta::try_seconds((hours * 3600.0).round() as i64).ok_or_else(|| {
        SunaError::configuration(format!("UTC offset {} hours is out of range", hours))
    })
}

/// Parse a field the timestamp depends on. `role` names what the field holds,
/// since the V1 source columns are not named after it.
fn parse_required(row: &RawRow<'_>, index: usize, role: &str, column: &str) -> Result<f64> {
    match parse_numeric(row.fields[index]) {
        Ok(Some(value)) => Ok(value),
        Ok(None) => Err(SunaError::malformed(
            row.line,
            format!("missing {} (column '{}')", role, column),
        )),
        Err(reason) => Err(SunaError::malformed(
            row.line,
            format!("{} (column '{}'): {}", role, column, reason),
        )),
    }
}

/// Parse a numeric field; empty and NaN fields are missing values.
fn parse_numeric(field: &str) -> std::result::Result<Option<f64>, String> {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<f64>()
        .map(|value| if value.is_nan() { None } else { Some(value) })
        .map_err(|_| format!("non-numeric value '{}'", trimmed))
}
