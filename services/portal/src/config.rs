//! Portal configuration loaded from the environment

use anyhow::Result;
use common::cms::CmsConfig;
use std::env;
use std::time::Duration;

use crate::webhook::DEFAULT_WEBHOOK_URL;

/// Portal service configuration
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Address the HTTP server binds to
    pub bind_addr: String,
    /// CMS location, also used for the authentication endpoints
    pub cms: CmsConfig,
    /// Lead-search webhook URL
    pub webhook_url: String,
    /// Timeout applied to every outbound request
    pub http_timeout: Duration,
    /// Lifetime of the persistent session cookies
    pub session_max_age: Duration,
    /// Whether cookies carry the `Secure` attribute
    pub cookie_secure: bool,
}

impl PortalConfig {
    /// Create a new PortalConfig from environment variables
    ///
    /// # Environment Variables
    /// - `PORTAL_BIND_ADDR`: Listen address (default: "0.0.0.0:3000")
    /// - `STRAPI_URL`, `CMS_REVALIDATE_SECONDS`: see [`CmsConfig::from_env`]
    /// - `LEAD_WEBHOOK_URL`: Lead-search webhook (default: the production n8n hook)
    /// - `HTTP_TIMEOUT_SECONDS`: Outbound request timeout (default: 30)
    /// - `SESSION_MAX_AGE_SECONDS`: Persistent cookie lifetime (default: 86400)
    /// - `COOKIE_SECURE`: "true" to mark cookies Secure (default: false)
    pub fn from_env() -> Result<Self> {
        let bind_addr = env::var("PORTAL_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let cms = CmsConfig::from_env()?;
        let webhook_url =
            env::var("LEAD_WEBHOOK_URL").unwrap_or_else(|_| DEFAULT_WEBHOOK_URL.to_string());

        let http_timeout = env::var("HTTP_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        let session_max_age = env::var("SESSION_MAX_AGE_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(86400);

        let cookie_secure = env::var("COOKIE_SECURE")
            .map(|s| matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        if webhook_url.trim().is_empty() {
            anyhow::bail!("LEAD_WEBHOOK_URL must not be empty");
        }

        Ok(Self {
            bind_addr,
            cms,
            webhook_url,
            http_timeout: Duration::from_secs(http_timeout),
            session_max_age: Duration::from_secs(session_max_age),
            cookie_secure,
        })
    }
}
