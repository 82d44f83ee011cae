use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::error::Error;

/// Sampling granularity of the device's historical logs.
///
/// The discriminant is the interval length in seconds, which is also how the
/// device reports it in log pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interval {
    PerMin = 60,
    Per10Min = 600,
    PerHour = 3600,
    PerDay = 86400,
}

impl Interval {
    pub const ALL: [Interval; 4] = [
        Interval::PerMin,
        Interval::Per10Min,
        Interval::PerHour,
        Interval::PerDay,
    ];

    /// Length of one interval in seconds
    pub fn delta(self) -> u32 {
        self as u32
    }

    pub fn duration(self) -> Duration {
        Duration::from_secs(u64::from(self.delta()))
    }

    /// Query parameter character selecting this interval on a log endpoint
    pub fn param(self) -> char {
        match self {
            Interval::PerMin => 'h',
            Interval::Per10Min => 'w',
            Interval::PerHour => 'd',
            Interval::PerDay => 'm',
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Interval::PerMin => "min",
            Interval::Per10Min => "10min",
            Interval::PerHour => "hour",
            Interval::PerDay => "day",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<u32> for Interval {
    type Error = Error;

    fn try_from(secs: u32) -> Result<Self, Self::Error> {
        Interval::ALL
            .into_iter()
            .find(|i| i.delta() == secs)
            .ok_or_else(|| Error::InvalidInterval(secs.to_string()))
    }
}

impl FromStr for Interval {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Interval::ALL
            .into_iter()
            .find(|i| i.label() == s)
            .ok_or_else(|| Error::InvalidInterval(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for Interval {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u32::deserialize(deserializer)?;
        Interval::try_from(secs).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta() {
        assert_eq!(Interval::PerMin.delta(), 60);
        assert_eq!(Interval::Per10Min.delta(), 600);
        assert_eq!(Interval::PerHour.delta(), 3600);
        assert_eq!(Interval::PerDay.delta(), 86400);
    }

    #[test]
    fn test_duration_matches_delta() {
        for interval in Interval::ALL {
            assert_eq!(
                interval.duration(),
                Duration::from_secs(interval.delta() as u64)
            );
        }
    }

    #[test]
    fn test_param() {
        assert_eq!(Interval::PerMin.param(), 'h');
        assert_eq!(Interval::Per10Min.param(), 'w');
        assert_eq!(Interval::PerHour.param(), 'd');
        assert_eq!(Interval::PerDay.param(), 'm');
    }

    #[test]
    fn test_display() {
        assert_eq!(Interval::PerMin.to_string(), "min");
        assert_eq!(Interval::Per10Min.to_string(), "10min");
        assert_eq!(Interval::PerHour.to_string(), "hour");
        assert_eq!(Interval::PerDay.to_string(), "day");
    }

    #[test]
    fn test_try_from_seconds() {
        for interval in Interval::ALL {
            assert_eq!(Interval::try_from(interval.delta()).unwrap(), interval);
        }
        let err = Interval::try_from(1).unwrap_err();
        assert_eq!(err.to_string(), "1 is not a valid interval");
    }

    #[test]
    fn test_from_str() {
        assert_eq!("10min".parse::<Interval>().unwrap(), Interval::Per10Min);
        assert!("week".parse::<Interval>().is_err());
    }

    #[test]
    fn test_deserialize() {
        let interval: Interval = serde_json::from_str("3600").unwrap();
        assert_eq!(interval, Interval::PerHour);
        assert!(serde_json::from_str::<Interval>("61").is_err());
    }
}
