//! Compact `YYMMDDHHmm` timestamps as used by the gas and water readings.

use chrono::{DateTime, Datelike, NaiveDateTime, Timelike, Utc};

use crate::error::{Error, Result};

/// chrono layout of a compact timestamp
pub const TIMESTAMP_LAYOUT: &str = "%y%m%d%H%M";

const TIMESTAMP_DIGITS: usize = 10;

/// Parses a compact timestamp like `2401281200` into UTC calendar time.
///
/// Years 2000 to 2009 have a leading zero that the numeric form drops, so
/// shorter values are zero padded. More than ten digits is an error.
pub fn parse_timestamp(ts: u64) -> Result<DateTime<Utc>> {
    let digits = format!("{ts:0width$}", width = TIMESTAMP_DIGITS);
    if digits.len() != TIMESTAMP_DIGITS {
        return Err(Error::InvalidTimestamp(ts));
    }
    NaiveDateTime::parse_from_str(&digits, TIMESTAMP_LAYOUT)
        .map(|t| t.and_utc())
        .map_err(|_| Error::InvalidTimestamp(ts))
}

/// Converts calendar time into a compact timestamp. Seconds are dropped.
///
/// Only the years 2000 to 2099 can be encoded.
pub fn to_timestamp(t: DateTime<Utc>) -> Result<u64> {
    let year = match t.year() {
        y @ 2000..=2099 => u64::from((y - 2000).unsigned_abs()),
        _ => return Err(Error::TimestampOutOfRange(t)),
    };
    Ok(year * 100_000_000
        + u64::from(t.month()) * 1_000_000
        + u64::from(t.day()) * 10_000
        + u64::from(t.hour()) * 100
        + u64::from(t.minute()))
}
