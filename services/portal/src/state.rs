//! Application state shared across handlers

use common::cms::ContentSource;
use std::sync::Arc;
use tower_cookies::Cookies;

use crate::{
    cookies::{CookieSettings, CookieStorage},
    credentials::AuthApi,
    session::SessionStore,
    webhook::LeadWebhook,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<dyn AuthApi>,
    pub content: Arc<dyn ContentSource>,
    pub webhook: Arc<dyn LeadWebhook>,
    pub cookie_settings: CookieSettings,
}

impl AppState {
    /// Session store over the cookies of the current request
    pub fn session_store(&self, cookies: Cookies) -> SessionStore<CookieStorage> {
        SessionStore::new(CookieStorage::new(cookies, self.cookie_settings))
    }
}
