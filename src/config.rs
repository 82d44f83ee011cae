use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserializer;
use serde_derive::Deserialize;
use url::Url;

use crate::error::{Error, Result};

const DEFAULT_BASE_URL: &str = "http://youless";
const DEFAULT_NAME: &str = "YouLess";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration of a [`Client`](crate::Client).
///
/// Can be deserialized (timeout in seconds) or read from `YOULESS_*`
/// environment variables.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the device
    pub base_url: String,
    /// Name of the device, only used in logs
    pub name: String,
    /// Time limit for a single request to the device
    #[serde(deserialize_with = "deserialize_secs")]
    pub timeout: Duration,
    /// Password used to connect with the device
    pub password: Option<String>,
    /// File containing the password. Takes precedence over `password`.
    pub password_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            name: DEFAULT_NAME.to_string(),
            timeout: DEFAULT_TIMEOUT,
            password: None,
            password_file: None,
        }
    }
}

impl Config {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_password_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.password_file = Some(path.into());
        self
    }

    /// Reads the configuration from the environment. Unset variables keep
    /// their default value.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Some(base_url) = non_empty_var("YOULESS_BASE_URL") {
            config.base_url = base_url;
        }
        if let Some(name) = non_empty_var("YOULESS_NAME") {
            config.name = name;
        }
        if let Some(timeout) = non_empty_var("YOULESS_TIMEOUT") {
            let secs: f64 = timeout
                .parse()
                .map_err(|_| Error::InvalidConfig(format!("invalid timeout `{timeout}`")))?;
            config.timeout = secs_to_duration(secs).map_err(Error::InvalidConfig)?;
        }
        config.password = non_empty_var("YOULESS_PASSWORD");
        config.password_file = non_empty_var("YOULESS_PASSWORD_FILE").map(PathBuf::from);
        Ok(config)
    }

    /// Checks the base URL, returning it parsed.
    pub fn validate(&self) -> Result<Url> {
        if self.base_url.is_empty() {
            return Err(Error::InvalidConfig("base url is required".to_string()));
        }
        let invalid = |reason: String| Error::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason,
        };

        let mut url = Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme `{}`", url.scheme())));
        }
        if url.cannot_be_a_base() || url.host().is_none() {
            return Err(invalid("url has no host".to_string()));
        }
        // joining endpoint paths must not drop the last path segment
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    pub fn has_credential(&self) -> bool {
        self.password_file.is_some() || self.inline_password().is_some()
    }

    /// Resolves the password: the password file when set, otherwise the
    /// plain password. `None` means the device needs no authentication.
    pub async fn password(&self) -> Result<Option<Arc<str>>> {
        if let Some(path) = &self.password_file {
            let contents =
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|e| Error::ReadPasswordFile {
                        path: path.clone(),
                        source: Arc::new(e),
                    })?;
            let password = contents.trim_end_matches(['\r', '\n']);
            return Ok(Some(Arc::from(password)));
        }
        Ok(self.inline_password().map(Arc::from))
    }

    // An empty password means none is set
    fn inline_password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

fn secs_to_duration(secs: f64) -> std::result::Result<Duration, String> {
    Duration::try_from_secs_f64(secs).map_err(|_| format!("invalid timeout `{secs}`"))
}

fn deserialize_secs<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let secs: f64 = serde::Deserialize::deserialize(deserializer)?;
    secs_to_duration(secs).map_err(serde::de::Error::custom)
}
