//! Common library for the DealerSpace portal
//!
//! This crate provides the pieces shared by the portal services: the CMS
//! content client and its revalidating cache, the outbound HTTP client,
//! the client-side storage abstraction, and error handling.

pub mod cache;
pub mod cms;
pub mod error;
pub mod http;
pub mod storage;

/// Example usage of the CMS module
///
/// ```rust,no_run
/// use common::cms::{CmsClient, CmsConfig, ContentSource};
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = CmsConfig::from_env()?;
///     let http = common::http::build_client(Duration::from_secs(30))?;
///     let cms = CmsClient::new(&config, http);
///     let labels = cms.site_labels().await?;
///     println!("Welcome title: {:?}", labels.get("welcomeTitle"));
///     Ok(())
/// }
/// ```
pub fn example_usage() {}
