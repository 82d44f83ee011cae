use serde_derive::Deserialize;
use tracing::instrument;

use crate::client::Client;
use crate::coordinator::{decode_json, Call};
use crate::error::Result;

#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
pub struct DeviceInfo {
    pub model: String,
    #[serde(rename = "fw", default)]
    pub firmware: String,
    #[serde(default)]
    pub mac: String,
}

impl Client {
    /// Model, firmware and MAC address of the device
    #[instrument(skip(self), fields(client = %self.config().name))]
    pub async fn device_info(&self) -> Result<DeviceInfo> {
        let body = self.execute(Call::get("d")).await?;
        decode_json(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_device_info() {
        let info: DeviceInfo =
            serde_json::from_str(r#"{"model":"LS120","fw":"1.6.2-EL","mac":"72:b8:ad:14:16:2e"}"#)
                .unwrap();
        assert_eq!(
            info,
            DeviceInfo {
                model: "LS120".to_string(),
                firmware: "1.6.2-EL".to_string(),
                mac: "72:b8:ad:14:16:2e".to_string(),
            }
        );
    }
}
