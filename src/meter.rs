use chrono::{DateTime, Utc};
use serde_derive::Deserialize;
use tracing::instrument;

use crate::client::Client;
use crate::coordinator::{decode_single, Call};
use crate::error::Result;
use crate::timestamp::parse_timestamp;

/// Response of the `/e` endpoint: a P1 telegram translated to JSON, plus the
/// S0, gas and water readings of the device.
#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MeterReading {
    #[serde(flatten)]
    pub electricity: ElectricityReading,
    #[serde(flatten)]
    pub s0: S0Reading,
    #[serde(flatten)]
    pub gas: GasReading,
    #[serde(flatten)]
    pub water: WaterReading,
}

#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ElectricityReading {
    /// Unix timestamp of the last meter reading
    #[serde(rename = "tm")]
    pub timestamp: i64,
    /// Total imported low tariff electricity in kWh
    #[serde(rename = "p1")]
    pub import1: f64,
    /// Total imported high tariff electricity in kWh
    #[serde(rename = "p2")]
    pub import2: f64,
    /// Total exported low tariff electricity in kWh
    #[serde(rename = "n1")]
    pub export1: f64,
    /// Total exported high tariff electricity in kWh
    #[serde(rename = "n2")]
    pub export2: f64,
    /// import1 + import2 - export1 - export2
    #[serde(rename = "net")]
    pub net: f64,
    /// Current power in Watt, negative when exporting
    #[serde(rename = "pwr")]
    pub power: i64,
}

#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct S0Reading {
    /// Unix timestamp of the last S0 reading
    #[serde(rename = "ts0")]
    pub timestamp: i64,
    /// Total kWh measured by the S0 meter
    #[serde(rename = "cs0")]
    pub total: f64,
    /// Current power in Watt measured by the S0 meter
    #[serde(rename = "ps0")]
    pub power: i64,
}

#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GasReading {
    /// Compact `YYMMDDHHmm` timestamp of the last gas reading
    #[serde(rename = "gts")]
    pub timestamp: u64,
    /// Delivered gas in m3
    #[serde(rename = "gas")]
    pub total: f64,
}

#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WaterReading {
    /// Compact `YYMMDDHHmm` timestamp of the last water reading
    #[serde(rename = "wts")]
    pub timestamp: u64,
    /// Delivered water in m3
    #[serde(rename = "wtr")]
    pub total: f64,
}

impl ElectricityReading {
    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }
}

impl S0Reading {
    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }
}

impl GasReading {
    pub fn time(&self) -> Result<DateTime<Utc>> {
        parse_timestamp(self.timestamp)
    }
}

impl WaterReading {
    pub fn time(&self) -> Result<DateTime<Utc>> {
        parse_timestamp(self.timestamp)
    }
}

impl Client {
    /// Current meter readings of all utilities
    #[instrument(skip(self), fields(client = %self.config().name))]
    pub async fn meter_reading(&self) -> Result<MeterReading> {
        let body = self.execute(Call::get("e")).await?;
        decode_single(&body)
    }
}
