use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::interval::Interval;

/// Metered utility channel of the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Utility {
    Electricity,
    Gas,
    Water,
    /// Pulse counter on the S0 input
    S0,
}

impl Utility {
    pub const ALL: [Utility; 4] = [
        Utility::Electricity,
        Utility::Gas,
        Utility::Water,
        Utility::S0,
    ];

    /// Path of the utility's log data on the device's api
    pub fn endpoint(self) -> &'static str {
        match self {
            Utility::Electricity => "V",
            Utility::Gas => "W",
            Utility::Water => "K",
            Utility::S0 => "Z",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Utility::Electricity => "electricity",
            Utility::Gas => "gas",
            Utility::Water => "water",
            Utility::S0 => "s0",
        }
    }

    /// Gas and water meters report at most every few minutes, so the device
    /// keeps no per-minute log for them.
    pub fn supports(self, interval: Interval) -> bool {
        !matches!(
            (self, interval),
            (Utility::Gas | Utility::Water, Interval::PerMin)
        )
    }

    /// Fails with [`Error::UnsupportedInterval`] when the device keeps no log
    /// for this combination.
    pub fn check_interval(self, interval: Interval) -> Result<(), Error> {
        if self.supports(interval) {
            Ok(())
        } else {
            Err(Error::UnsupportedInterval {
                utility: self,
                interval,
            })
        }
    }
}

impl fmt::Display for Utility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Utility {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        match lower.as_str() {
            // the device's own pages call it "power"
            "power" => Ok(Utility::Electricity),
            _ => Utility::ALL
                .into_iter()
                .find(|u| u.name() == lower)
                .ok_or_else(|| Error::InvalidUtility(s.to_string())),
        }
    }
}
