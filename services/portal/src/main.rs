use anyhow::Result;
use common::{cms::CmsClient, http::build_client};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod cookies;
mod credentials;
mod error;
mod middleware;
mod nav;
mod reset_flow;
mod routes;
mod search;
mod session;
mod state;
mod templates;
#[cfg(test)]
mod testing;
mod validation;
mod webhook;

use crate::{
    config::PortalConfig, cookies::CookieSettings, credentials::StrapiAuthClient,
    state::AppState, webhook::N8nWebhook,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting DealerSpace portal");

    let config = PortalConfig::from_env()?;
    let http = build_client(config.http_timeout)?;

    info!("Using CMS at {}", config.cms.base_url);

    let app_state = AppState {
        auth: Arc::new(StrapiAuthClient::new(config.cms.base_url.clone(), http.clone())),
        content: Arc::new(CmsClient::new(&config.cms, http.clone())),
        webhook: Arc::new(N8nWebhook::new(config.webhook_url.clone(), http)),
        cookie_settings: CookieSettings {
            max_age: config.session_max_age,
            secure: config.cookie_secure,
        },
    };

    // Start the web server
    let app = routes::create_router(app_state);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!("Portal listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
