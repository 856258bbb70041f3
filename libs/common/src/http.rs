//! Shared outbound HTTP client

use std::time::Duration;

use crate::error::{ClientError, ClientResult};

/// Build the client used for every upstream call
///
/// A request that exceeds `timeout` fails with [`ClientError::Transport`].
pub fn build_client(timeout: Duration) -> ClientResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("dealerspace-portal/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ClientError::Configuration(format!("Failed to build HTTP client: {}", e)))
}

/// Join a base URL and a path without doubling slashes
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("https://api.example.com/", "/api/auth/local"),
            "https://api.example.com/api/auth/local"
        );
        assert_eq!(
            join_url("https://api.example.com", "api/site-ui-label"),
            "https://api.example.com/api/site-ui-label"
        );
    }
}
