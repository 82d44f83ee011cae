//! Request coordination for the device's HTTP api.
//!
//! Every call to the device goes through [`Coordinator::execute`], which
//! joins concurrent identical calls, authenticates on demand and turns HTTP
//! responses into bytes or [`Error`]s.

use std::sync::Arc;

use bytes::Bytes;
use futures::future::{BoxFuture, FutureExt};
use reqwest::header::{COOKIE, LOCATION};
use reqwest::redirect::Policy;
use reqwest::{ClientBuilder, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::Config;
use crate::cookie::{AuthCookie, CookieSlot};
use crate::error::{Error, Result};
use crate::flight::InFlight;

/// Form field carrying the password
const PASSWORD_FIELD: &str = "w";

const MAX_REDIRECTS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallKind {
    /// Data request, 403 means a password is needed
    Fetch,
    /// Authentication, 403 means the password is wrong
    Login,
}

/// Identity under which concurrent calls are joined. Logins never share
/// a key with data requests, whatever their path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CallKey {
    Login,
    Path(String),
}

/// A single logical call to the device
pub(crate) struct Call {
    key: CallKey,
    path: String,
    method: Method,
    form: Option<Vec<(&'static str, String)>>,
    requires_auth: bool,
    kind: CallKind,
}

impl Call {
    /// GET of a device path, e.g. `d` or `V?p=1`. The path is the dedup key.
    pub fn get(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            key: CallKey::Path(path.clone()),
            path,
            method: Method::GET,
            form: None,
            requires_auth: true,
            kind: CallKind::Fetch,
        }
    }

    /// Form POST of the password to the base url
    pub fn login(password: &str) -> Self {
        Self {
            key: CallKey::Login,
            path: String::new(),
            method: Method::POST,
            form: Some(vec![(PASSWORD_FIELD, password.to_string())]),
            requires_auth: false,
            kind: CallKind::Login,
        }
    }
}

struct Inner {
    config: Config,
    base_url: Url,
    http: reqwest::Client,
    cookie: CookieSlot,
    in_flight: InFlight<CallKey, Result<Reply>>,
}

/// Outcome of one exchange
#[derive(Clone)]
struct Reply {
    body: Bytes,
    /// Session cookie captured while handling this exchange
    cookie: Option<Arc<AuthCookie>>,
}

/// Owns the session cookie and the registry of in-flight calls of one
/// device. Clones share both.
#[derive(Clone)]
pub(crate) struct Coordinator {
    inner: Arc<Inner>,
}

impl Coordinator {
    pub fn new(config: Config, builder: ClientBuilder) -> Result<Self> {
        let base_url = config.validate()?;
        // Redirects are followed by hand so cookies on intermediate
        // responses are not lost.
        let http = builder
            .timeout(config.timeout)
            .redirect(Policy::none())
            .build()?;

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                base_url,
                http,
                cookie: CookieSlot::default(),
                in_flight: InFlight::default(),
            }),
        })
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Executes `call`, or joins the identical call already in flight.
    pub async fn execute(&self, call: Call) -> Result<Bytes> {
        self.run(call).await.map(|reply| reply.body)
    }

    async fn run(&self, call: Call) -> Result<Reply> {
        let url = self
            .inner
            .base_url
            .join(&call.path)
            .map_err(|e| Error::InvalidBaseUrl {
                url: self.inner.base_url.to_string(),
                reason: e.to_string(),
            })?;

        let key = call.key.clone();
        let this = self.clone();
        let (res, joined) = self
            .inner
            .in_flight
            .run(&key, move || this.exchange(call, url))
            .await;
        if joined {
            debug!(client = %self.inner.config.name, ?key, "joined in-flight request");
        }
        res
    }

    /// Returns the cached session cookie, authenticating first when none is
    /// cached and a password is configured. `None` means the device is used
    /// without authentication.
    pub async fn auth_cookie(&self) -> Result<Option<Arc<AuthCookie>>> {
        if let Some(cookie) = self.inner.cookie.load() {
            return Ok(Some(cookie));
        }
        match self.inner.config.password().await? {
            Some(password) => self.authenticate(&password).await.map(Some),
            None => Ok(None),
        }
    }

    /// Logs in with `password` and returns the session cookie handed out by
    /// the device. Replaces any cached cookie.
    pub async fn authenticate(&self, password: &str) -> Result<Arc<AuthCookie>> {
        self.run(Call::login(password))
            .await?
            .cookie
            .ok_or(Error::MissingAuthCookie)
    }

    // Boxed so the exchange future does not contain itself through the
    // authentication call.
    fn ensure_cookie(&self) -> BoxFuture<'static, Result<Option<Arc<AuthCookie>>>> {
        let this = self.clone();
        async move { this.auth_cookie().await }.boxed()
    }

    async fn exchange(self, call: Call, url: Url) -> Result<Reply> {
        let cookie = if call.requires_auth {
            self.ensure_cookie().await?
        } else {
            self.inner.cookie.load()
        };

        debug!(client = %self.inner.config.name, %url, method = %call.method, "requesting");
        let mut request = self.request(call.method.clone(), url.clone(), cookie.as_deref());
        if let Some(form) = &call.form {
            request = request.form(form);
        }
        let (response, captured) = self.follow_redirects(request.send().await?).await?;

        let status = response.status();
        if let Some(err) = classify(status, call.kind) {
            warn!(client = %self.inner.config.name, %url, %status, "request failed: {err}");
            return Err(err);
        }
        Ok(Reply {
            body: response.bytes().await?,
            cookie: captured,
        })
    }

    fn request(&self, method: Method, url: Url, cookie: Option<&AuthCookie>) -> RequestBuilder {
        let mut request = self.inner.http.request(method, url);
        if let Some(value) = cookie.and_then(AuthCookie::header_value) {
            request = request.header(COOKIE, value);
        }
        request
    }

    /// Follows redirects until a response is final or carries the session
    /// cookie. The device answers a login with a redirect that sets it.
    /// Returns the final response and the cookie it carried, if any.
    async fn follow_redirects(
        &self,
        mut response: Response,
    ) -> Result<(Response, Option<Arc<AuthCookie>>)> {
        let mut hops = 0;
        loop {
            if let Some(cookie) = self.capture_cookie(&response) {
                return Ok((response, Some(cookie)));
            }
            if !response.status().is_redirection() {
                return Ok((response, None));
            }
            let Some(next) = redirect_target(&response) else {
                return Ok((response, None));
            };
            if hops == MAX_REDIRECTS {
                return Ok((response, None));
            }
            hops += 1;

            let cookie = self.inner.cookie.load();
            response = self
                .request(Method::GET, next, cookie.as_deref())
                .send()
                .await?;
        }
    }

    /// Stores the session cookie when the response carries one. This is the
    /// only place the cookie is written.
    fn capture_cookie(&self, response: &Response) -> Option<Arc<AuthCookie>> {
        let cookie = Arc::new(AuthCookie::from_response(response)?);
        info!(
            client = %self.inner.config.name,
            expires = ?cookie.expires,
            "fetched auth cookie"
        );
        self.inner.cookie.store(Arc::clone(&cookie));
        Some(cookie)
    }
}

fn classify(status: StatusCode, kind: CallKind) -> Option<Error> {
    if status == StatusCode::FORBIDDEN {
        return Some(match kind {
            CallKind::Fetch => Error::PasswordRequired,
            CallKind::Login => Error::InvalidPassword,
        });
    }
    if status.as_u16() > 400 {
        return Some(Error::unexpected_response(status));
    }
    None
}

fn redirect_target(response: &Response) -> Option<Url> {
    let location = response.headers().get(LOCATION)?.to_str().ok()?;
    response.url().join(location).ok()
}

/// Deserializes a JSON response body
pub(crate) fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    Ok(serde_json::from_slice(body)?)
}

/// Deserializes a response that wraps its single value in an array
pub(crate) fn decode_single<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let items: Vec<T> = decode_json(body)?;
    items.into_iter().next().ok_or(Error::EmptyResponse)
}
