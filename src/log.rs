use std::fmt;

use chrono::NaiveDateTime;
use serde_derive::Deserialize;
use tracing::instrument;

use crate::client::Client;
use crate::coordinator::{decode_json, Call};
use crate::error::{Error, Result, SampleDecodeError};
use crate::interval::Interval;
use crate::utility::Utility;

/// Layout of a log page's start time, e.g. `2024-01-28T12:00:00`
pub const LOG_TIME_LAYOUT: &str = "%Y-%m-%dT%H:%M:%S";

/// Placeholder the device uses for a slot without data
const INACTIVE_VALUE: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub enum Unit {
    #[serde(rename = "Watt")]
    Watt,
    #[serde(rename = "kWh")]
    KiloWattHour,
    #[serde(rename = "L")]
    Liter,
    #[serde(rename = "m3")]
    CubicMeter,
    #[serde(other)]
    Unknown,
}

/// One page of historical samples for a utility at a fixed interval
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LogPage {
    #[serde(rename = "un")]
    pub unit: Unit,
    #[serde(rename = "tm")]
    pub timestamp: String,
    #[serde(rename = "dt")]
    pub interval: Interval,
    #[serde(rename = "val")]
    pub raw_values: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedValue {
    pub time: NaiveDateTime,
    pub value: i64,
    /// The device recorded nothing for this slot
    pub inactive: bool,
}

impl fmt::Display for TimedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.inactive {
            f.write_str(INACTIVE_VALUE)
        } else {
            write!(f, "{}", self.value)
        }
    }
}

impl LogPage {
    /// Start time of the page in device local time
    pub fn time(&self) -> Result<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.timestamp, LOG_TIME_LAYOUT)
            .map_err(|_| Error::InvalidLogTime(self.timestamp.clone()))
    }

    /// Time of the value at index `i`
    pub fn time_of_value(&self, i: usize) -> Result<NaiveDateTime> {
        let start = self.time()?;
        i32::try_from(i)
            .ok()
            .and_then(|n| self.interval_delta().checked_mul(n))
            .and_then(|offset| start.checked_add_signed(offset))
            .ok_or(Error::LogTimeOutOfRange(i))
    }

    fn interval_delta(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::from(self.interval.delta()))
    }

    /// Decodes the raw values into timed samples.
    ///
    /// The device pre-allocates every slot of a page, so a trailing empty
    /// value is not a sample and is skipped. On a malformed value the error
    /// carries the samples decoded up to that point.
    pub fn timed_values(&self) -> Result<Vec<TimedValue>> {
        let mut time = self.time()?;
        let delta = self.interval_delta();

        let mut values = self.raw_values.as_slice();
        if let Some((last, rest)) = values.split_last() {
            if last.is_empty() {
                values = rest;
            }
        }

        let mut res = Vec::with_capacity(values.len());
        for (index, raw) in values.iter().enumerate() {
            let mut tv = TimedValue {
                time,
                value: 0,
                inactive: false,
            };
            time = time
                .checked_add_signed(delta)
                .ok_or(Error::LogTimeOutOfRange(index + 1))?;

            if raw.is_empty() || raw == INACTIVE_VALUE {
                tv.inactive = true;
                res.push(tv);
                continue;
            }

            match raw.trim().parse::<i64>() {
                Ok(n) => {
                    tv.value = n;
                    res.push(tv);
                }
                Err(source) => {
                    return Err(SampleDecodeError {
                        decoded: res,
                        index,
                        value: raw.clone(),
                        source,
                    }
                    .into())
                }
            }
        }
        Ok(res)
    }
}

impl Client {
    /// Retrieves a page of the log of `utility` at `interval`.
    ///
    /// Page numbers start at 1.
    #[instrument(skip(self))]
    pub async fn log_page(
        &self,
        utility: Utility,
        interval: Interval,
        page: u32,
    ) -> Result<LogPage> {
        utility.check_interval(interval)?;
        if page == 0 {
            return Err(Error::InvalidLogPage);
        }

        let path = log_path(utility, interval, page);
        let body = self.execute(Call::get(path)).await?;
        decode_json(&body)
    }
}

fn log_path(utility: Utility, interval: Interval, page: u32) -> String {
    format!(
        "{}?{}={}&f=j",
        utility.endpoint(),
        interval.param(),
        page
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn page(interval: Interval, values: &[&str]) -> LogPage {
        LogPage {
            unit: Unit::Watt,
            timestamp: "2024-01-01T00:00:00".to_string(),
            interval,
            raw_values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    #[test]
    fn test_timed_values_skips_trailing_empty_slot() {
        let values = page(Interval::PerHour, &["10", "*", "20", ""])
            .timed_values()
            .unwrap();

        assert_eq!(
            values,
            vec![
                TimedValue {
                    time: at(0, 0),
                    value: 10,
                    inactive: false
                },
                TimedValue {
                    time: at(1, 0),
                    value: 0,
                    inactive: true
                },
                TimedValue {
                    time: at(2, 0),
                    value: 20,
                    inactive: false
                },
            ]
        );
    }

    #[test]
    fn test_timed_values_empty_slot_in_the_middle_is_inactive() {
        let values = page(Interval::Per10Min, &["", " 7 ", "8"])
            .timed_values()
            .unwrap();

        assert_eq!(values.len(), 3);
        assert!(values[0].inactive);
        assert_eq!(values[1].value, 7);
        assert_eq!(values[1].time, at(0, 10));
        assert_eq!(values[2].time, at(0, 20));
    }

    #[test]
    fn test_timed_values_returns_partial_samples_on_error() {
        let err = page(Interval::PerMin, &["1", "2", "x", "4"])
            .timed_values()
            .unwrap_err();

        match err {
            Error::Samples(e) => {
                assert_eq!(e.index, 2);
                assert_eq!(e.value, "x");
                assert_eq!(e.decoded.len(), 2);
                assert_eq!(e.decoded[1].time, at(0, 1));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_timed_values_invalid_start_time() {
        let mut p = page(Interval::PerDay, &["1"]);
        p.timestamp = "yesterday".to_string();
        assert!(matches!(p.timed_values(), Err(Error::InvalidLogTime(_))));
    }

    #[test]
    fn test_time_of_value() {
        let p = page(Interval::PerHour, &[]);
        assert_eq!(p.time_of_value(0).unwrap(), at(0, 0));
        assert_eq!(p.time_of_value(5).unwrap(), at(5, 0));
        assert!(p.timed_values().unwrap().is_empty());
    }

    #[test]
    fn test_time_of_value_out_of_range() {
        let p = page(Interval::PerDay, &[]);
        assert!(matches!(
            p.time_of_value(usize::MAX),
            Err(Error::LogTimeOutOfRange(usize::MAX))
        ));
        // fits in i32 but lands far past the last representable date
        assert!(matches!(
            p.time_of_value(i32::MAX as usize),
            Err(Error::LogTimeOutOfRange(_))
        ));
    }

    #[test]
    fn test_timed_value_display() {
        let mut tv = TimedValue {
            time: at(0, 0),
            value: 42,
            inactive: false,
        };
        assert_eq!(tv.to_string(), "42");
        tv.inactive = true;
        assert_eq!(tv.to_string(), "*");
    }

    #[test]
    fn test_deserialize_log_page() {
        let json = r#"{"un":"kWh","tm":"2024-01-28T00:00:00","dt":86400,"val":["1.234","*",""]}"#;
        let page: LogPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.unit, Unit::KiloWattHour);
        assert_eq!(page.interval, Interval::PerDay);
        assert_eq!(page.raw_values.len(), 3);

        let json = r#"{"un":"kW","tm":"2024-01-28T00:00:00","dt":60,"val":[]}"#;
        let page: LogPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.unit, Unit::Unknown);
    }

    #[test]
    fn test_log_path() {
        assert_eq!(log_path(Utility::Gas, Interval::PerHour, 3), "W?d=3&f=j");
        assert_eq!(log_path(Utility::Electricity, Interval::PerMin, 1), "V?h=1&f=j");
    }
}
