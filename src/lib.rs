//! YouLess Client Library
//!
//! Async client for the local HTTP api of YouLess energy monitors. It reads
//! device info, live meter and phase readings, raw P1 telegrams and log pages,
//! and logs in with the device password when one is configured.
//!
//! ```rust,no_run
//! use youless_client::{Client, Config, Interval, Utility};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = Client::new(Config::new("http://192.168.1.10").with_password("secret"))?;
//!
//!     let reading = client.meter_reading().await?;
//!     println!("current power {}W", reading.electricity.power);
//!
//!     let page = client.log_page(Utility::Gas, Interval::PerHour, 1).await?;
//!     for value in page.timed_values()? {
//!         println!("{} {}", value.time, value);
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod cookie;
mod coordinator;
pub mod device;
pub mod error;
mod flight;
pub mod interval;
pub mod log;
pub mod meter;
pub mod phase;
pub mod telegram;
pub mod timestamp;
pub mod utility;

// Re-export commonly used types for easier access
pub use client::Client;
pub use config::Config;
pub use cookie::AuthCookie;
pub use device::DeviceInfo;
pub use error::{Error, Result, SampleDecodeError};
pub use interval::Interval;
pub use log::{LogPage, TimedValue, Unit};
pub use meter::MeterReading;
pub use phase::{Phase, PhaseReadings};
pub use telegram::P1Telegram;
pub use timestamp::{parse_timestamp, to_timestamp};
pub use utility::Utility;
