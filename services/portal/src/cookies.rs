//! Cookie-backed client-side storage
//!
//! Persistent values become cookies with a max-age; tab-scoped values
//! become session cookies the browser drops when it closes. Values are
//! form-urlencoded so JSON fits in a cookie.

use common::storage::{SessionStorage, StorageScope};
use std::time::Duration;
use tower_cookies::{
    Cookie, Cookies,
    cookie::{SameSite, time},
};
use url::form_urlencoded;

/// Attributes applied to every cookie the portal writes
#[derive(Debug, Clone, Copy)]
pub struct CookieSettings {
    /// Lifetime of persistent cookies
    pub max_age: Duration,
    /// Mark cookies `Secure`
    pub secure: bool,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            max_age: Duration::from_secs(86400),
            secure: false,
        }
    }
}

/// Storage over the cookies of the current request/response
#[derive(Clone)]
pub struct CookieStorage {
    cookies: Cookies,
    settings: CookieSettings,
}

impl CookieStorage {
    pub fn new(cookies: Cookies, settings: CookieSettings) -> Self {
        Self { cookies, settings }
    }
}

/// Cookie name for `key` in `scope`
pub fn cookie_name(scope: StorageScope, key: &str) -> String {
    format!("ds_{}_{}", scope.as_str(), key)
}

fn encode_value(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

fn decode_value(raw: &str) -> String {
    // encoded values never contain '=' or '&', so the whole input parses as one key
    form_urlencoded::parse(raw.as_bytes())
        .next()
        .map(|(key, _)| key.into_owned())
        .unwrap_or_default()
}

impl SessionStorage for CookieStorage {
    fn get(&self, scope: StorageScope, key: &str) -> Option<String> {
        self.cookies
            .get(&cookie_name(scope, key))
            .map(|cookie| decode_value(cookie.value()))
    }

    fn set(&self, scope: StorageScope, key: &str, value: &str) {
        let mut cookie = Cookie::new(cookie_name(scope, key), encode_value(value));
        cookie.set_path("/");
        cookie.set_http_only(true);
        cookie.set_secure(self.settings.secure);
        cookie.set_same_site(SameSite::Lax);

        if scope == StorageScope::Persistent {
            let seconds = i64::try_from(self.settings.max_age.as_secs()).unwrap_or(i64::MAX);
            cookie.set_max_age(time::Duration::seconds(seconds));
        }

        self.cookies.add(cookie);
    }

    fn remove(&self, scope: StorageScope, key: &str) {
        let mut cookie = Cookie::new(cookie_name(scope, key), "");
        cookie.set_path("/");
        self.cookies.remove(cookie);
    }
}
