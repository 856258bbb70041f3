//! Session guard for protected pages

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_cookies::Cookies;
use tracing::info;
use url::form_urlencoded;

use crate::{nav::LOGIN_ROUTE, state::AppState};

/// Default protected route after login
pub const HOME_ROUTE: &str = "/";

/// Redirect to the login page unless a session token is stored
///
/// The token itself is not verified here; the CMS validates it on use.
pub async fn require_session(
    State(state): State<AppState>,
    cookies: Cookies,
    req: Request<Body>,
    next: Next,
) -> Response {
    if state.session_store(cookies).token().is_some() {
        return next.run(req).await;
    }

    let target = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or(HOME_ROUTE);

    info!("No session for {}, redirecting to login", req.uri().path());
    Redirect::to(&login_url(target)).into_response()
}

/// Login URL that returns to `target` afterwards
pub fn login_url(target: &str) -> String {
    if target == HOME_ROUTE {
        return LOGIN_ROUTE.to_string();
    }

    let encoded: String = form_urlencoded::byte_serialize(target.as_bytes()).collect();
    format!("{}?redirect={}", LOGIN_ROUTE, encoded)
}

/// Post-login destination, restricted to local paths
///
/// Control characters are refused outright: browsers strip tabs and
/// newlines from URLs, and they are not valid in a `Location` header.
pub fn safe_redirect(target: Option<&str>) -> String {
    match target.map(str::trim) {
        Some(path)
            if !path.chars().any(char::is_control)
                && path.starts_with('/')
                && !path.starts_with("//")
                && !path.starts_with("/\\")
                && !path.starts_with(LOGIN_ROUTE) =>
        {
            path.to_string()
        }
        _ => HOME_ROUTE.to_string(),
    }
}
