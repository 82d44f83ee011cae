use serde_derive::Deserialize;
use tracing::instrument;

use crate::client::Client;
use crate::coordinator::{decode_json, Call};
use crate::error::Result;

/// Response of the `/f` endpoint with per phase readings
#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PhaseReadings {
    /// Current tariff
    #[serde(rename = "tr")]
    pub tariff: u8,

    #[serde(rename = "i1")]
    pub current1: f64,
    #[serde(rename = "i2")]
    pub current2: f64,
    #[serde(rename = "i3")]
    pub current3: f64,

    #[serde(rename = "l1")]
    pub power1: i64,
    #[serde(rename = "l2")]
    pub power2: i64,
    #[serde(rename = "l3")]
    pub power3: i64,

    #[serde(rename = "v1")]
    pub voltage1: f64,
    #[serde(rename = "v2")]
    pub voltage2: f64,
    #[serde(rename = "v3")]
    pub voltage3: f64,
}

/// Readings of a single phase
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct Phase {
    /// Imported current in Ampere
    pub current: f64,
    /// Imported power in Watt
    pub power: i64,
    pub voltage: f64,
}

impl Phase {
    /// Whether anything flows over this phase
    pub fn in_use(&self) -> bool {
        self.current != 0.0 || self.power != 0
    }
}

impl PhaseReadings {
    pub fn phase1(&self) -> Phase {
        Phase {
            current: self.current1,
            power: self.power1,
            voltage: self.voltage1,
        }
    }

    pub fn phase2(&self) -> Phase {
        Phase {
            current: self.current2,
            power: self.power2,
            voltage: self.voltage2,
        }
    }

    pub fn phase3(&self) -> Phase {
        Phase {
            current: self.current3,
            power: self.power3,
            voltage: self.voltage3,
        }
    }

    pub fn phases(&self) -> [Phase; 3] {
        [self.phase1(), self.phase2(), self.phase3()]
    }
}

impl Client {
    /// Current, power and voltage of each phase
    #[instrument(skip(self), fields(client = %self.config().name))]
    pub async fn phase_readings(&self) -> Result<PhaseReadings> {
        let body = self.execute(Call::get("f")).await?;
        decode_json(&body)
    }
}
