use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::RwLock;
use reqwest::header::HeaderValue;

/// Name of the session cookie the device hands out after authenticating
pub const AUTH_COOKIE_NAME: &str = "tk";

/// Session cookie received from the device
#[derive(Clone, PartialEq, Eq)]
pub struct AuthCookie {
    pub name: String,
    pub value: String,
    pub expires: Option<SystemTime>,
}

impl AuthCookie {
    /// Picks the session cookie out of a response, if the device set one
    pub fn from_response(response: &reqwest::Response) -> Option<Self> {
        response
            .cookies()
            .find(|c| c.name() == AUTH_COOKIE_NAME)
            .map(|c| Self {
                name: c.name().to_string(),
                value: c.value().to_string(),
                expires: c.expires(),
            })
    }

    /// `Cookie` request header value
    pub fn header_value(&self) -> Option<HeaderValue> {
        HeaderValue::from_str(&format!("{}={}", self.name, self.value)).ok()
    }
}

// The value is a credential, keep it out of logs.
impl fmt::Debug for AuthCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthCookie")
            .field("name", &self.name)
            .field("value", &"***")
            .field("expires", &self.expires)
            .finish()
    }
}

/// Single-slot cell holding the current session cookie.
///
/// A stored cookie replaces the previous one as a whole; readers always see
/// either the old or the new cookie.
#[derive(Debug, Default)]
pub(crate) struct CookieSlot {
    cookie: RwLock<Option<Arc<AuthCookie>>>,
}

impl CookieSlot {
    pub fn load(&self) -> Option<Arc<AuthCookie>> {
        self.cookie.read().clone()
    }

    pub fn store(&self, cookie: Arc<AuthCookie>) {
        *self.cookie.write() = Some(cookie);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cookie(value: &str) -> AuthCookie {
        AuthCookie {
            name: AUTH_COOKIE_NAME.to_string(),
            value: value.to_string(),
            expires: None,
        }
    }

    #[test]
    fn test_slot_starts_empty() {
        let slot = CookieSlot::default();
        assert!(slot.load().is_none());
    }

    #[test]
    fn test_store_replaces_cookie() {
        let slot = CookieSlot::default();
        slot.store(Arc::new(cookie("first")));
        let first = slot.load().unwrap();

        slot.store(Arc::new(cookie("second")));
        assert_eq!(slot.load().unwrap().value, "second");
        // earlier readers keep the cookie they loaded
        assert_eq!(first.value, "first");
    }

    #[test]
    fn test_header_value() {
        let header = cookie("abc123").header_value().unwrap();
        assert_eq!(header.to_str().unwrap(), "tk=abc123");
    }

    #[test]
    fn test_debug_hides_value() {
        let debug = format!("{:?}", cookie("secret"));
        assert!(!debug.contains("secret"));
    }
}
