//! Error types for YouLess client operations

use std::num::ParseIntError;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use thiserror::Error;

use crate::interval::Interval;
use crate::log::TimedValue;
use crate::utility::Utility;

/// Result type alias for YouLess client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during YouLess client operations
///
/// Errors are cheap to clone so that every caller joined to a shared
/// request observes the same outcome.
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// Configuration is incomplete
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Base URL could not be parsed or is not an http(s) URL
    #[error("invalid base url `{url}`: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// Password file could not be read
    #[error("failed to read password file {path:?}: {source}")]
    ReadPasswordFile {
        path: PathBuf,
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The device requires a password and none was available
    #[error("password required")]
    PasswordRequired,

    /// The device rejected the password
    #[error("invalid password")]
    InvalidPassword,

    /// Authentication succeeded but the device did not hand out a session cookie
    #[error("authentication did not yield a session cookie")]
    MissingAuthCookie,

    /// Device answered with an unexpected status code
    #[error("unexpected response status code: {status}, {}", status_text(.status))]
    UnexpectedResponse { status: u16 },

    /// HTTP request failed (connect, timeout, body read)
    #[error("HTTP request failed: {0}")]
    Transport(#[source] Arc<reqwest::Error>),

    /// Failed to decode a JSON response
    #[error("failed to decode response: {0}")]
    Decode(#[source] Arc<serde_json::Error>),

    /// Device returned an empty array where one element was expected
    #[error("device returned an empty response")]
    EmptyResponse,

    /// Utility does not keep logs at the requested interval
    #[error("utility {utility} does not support interval `{interval}`")]
    UnsupportedInterval { utility: Utility, interval: Interval },

    /// Log page index out of range
    #[error("page cannot be <= 0; index starts at 1")]
    InvalidLogPage,

    /// Not one of the known interval values
    #[error("{0} is not a valid interval")]
    InvalidInterval(String),

    /// Not one of the known utility names
    #[error("{0} is not a valid utility")]
    InvalidUtility(String),

    /// Compact `YYMMDDHHmm` timestamp could not be parsed
    #[error("invalid timestamp {0}")]
    InvalidTimestamp(u64),

    /// Calendar time outside the years a compact timestamp can hold
    #[error("{0} cannot be encoded as a compact timestamp")]
    TimestampOutOfRange(DateTime<Utc>),

    /// Log page start time could not be parsed
    #[error("invalid log time `{0}`")]
    InvalidLogTime(String),

    /// Time of the log value at this index is out of range
    #[error("time of log value {0} is out of range")]
    LogTimeOutOfRange(usize),

    /// Log page contained a value that is not a number
    #[error(transparent)]
    Samples(#[from] SampleDecodeError),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(Arc::new(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(Arc::new(err))
    }
}

impl Error {
    /// Create an unexpected response error from a status code
    pub fn unexpected_response(status: StatusCode) -> Self {
        Self::UnexpectedResponse {
            status: status.as_u16(),
        }
    }

    /// Whether the error comes from the device refusing access
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            Self::PasswordRequired | Self::InvalidPassword | Self::MissingAuthCookie
        )
    }
}

fn status_text(status: &u16) -> &'static str {
    StatusCode::from_u16(*status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("")
}

/// Decoding a log page stopped at a malformed value.
///
/// `decoded` holds every sample that was decoded before the failure.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("invalid log value `{value}` at index {index}: {source}")]
pub struct SampleDecodeError {
    pub decoded: Vec<TimedValue>,
    pub index: usize,
    pub value: String,
    #[source]
    pub source: ParseIntError,
}
