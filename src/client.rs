use std::sync::Arc;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::config::Config;
use crate::cookie::AuthCookie;
use crate::coordinator::{decode_json, Call, Coordinator};
use crate::error::Result;

/// Client of a single YouLess device.
///
/// Cheap to clone; clones share the session cookie and join each other's
/// identical requests. Endpoint calls are implemented in the modules of the
/// respective responses.
#[derive(Clone)]
pub struct Client {
    coordinator: Coordinator,
}

impl Client {
    /// Create a client for the device described by `config`
    pub fn new(config: Config) -> Result<Self> {
        Self::with_http_client(config, reqwest::Client::builder())
    }

    /// Create a client on top of a custom HTTP client configuration. The
    /// timeout and redirect policy are set from `config`.
    pub fn with_http_client(config: Config, builder: reqwest::ClientBuilder) -> Result<Self> {
        Ok(Self {
            coordinator: Coordinator::new(config, builder)?,
        })
    }

    /// Create a client from `YOULESS_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(Config::from_env()?)
    }

    pub fn config(&self) -> &Config {
        self.coordinator.config()
    }

    /// Logs in with `password`, replacing any cached session cookie
    #[instrument(skip_all, fields(client = %self.config().name))]
    pub async fn authenticate(&self, password: &str) -> Result<Arc<AuthCookie>> {
        self.coordinator.authenticate(password).await
    }

    /// Session cookie used for requests, fetched with the configured
    /// password when not cached yet
    pub async fn auth_cookie(&self) -> Result<Option<Arc<AuthCookie>>> {
        self.coordinator.auth_cookie().await
    }

    /// Raw body of the device page at `path`, e.g. `V?p=1`
    #[instrument(skip(self), fields(client = %self.config().name))]
    pub async fn get_raw(&self, path: &str) -> Result<Bytes> {
        self.execute(Call::get(path)).await
    }

    /// JSON response of the device page at `path` decoded into `T`
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = self.get_raw(path).await?;
        decode_json(&body)
    }

    pub(crate) async fn execute(&self, call: Call) -> Result<Bytes> {
        self.coordinator.execute(call).await
    }
}
