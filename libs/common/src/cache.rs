//! Revalidating in-memory cache
//!
//! CMS content is fetched at most once per revalidation window. Callers
//! hand the cache a loader; while the stored value is fresh the loader is
//! not called. When a refresh fails, the last good value is served for
//! another full window and the error is only surfaced if nothing was ever
//! cached. Concurrent callers wait on the same lock, so one failed refresh
//! answers all of them.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Cached value and the moment it was fetched
#[derive(Debug)]
struct CacheEntry<T> {
    value: T,
    fetched_at: Instant,
}

/// Single-value cache with a fixed revalidation interval
#[derive(Debug, Clone)]
pub struct RevalidatingCache<T> {
    name: &'static str,
    ttl: Duration,
    entry: Arc<Mutex<Option<CacheEntry<T>>>>,
}

impl<T: Clone> RevalidatingCache<T> {
    /// Create an empty cache
    pub fn new(name: &'static str, ttl: Duration) -> Self {
        Self {
            name,
            ttl,
            entry: Arc::new(Mutex::new(None)),
        }
    }

    /// Get the cached value, calling `load` when it is missing or stale
    pub async fn get_or_refresh<F, Fut, E>(&self, load: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut entry = self.entry.lock().await;
        let now = Instant::now();

        if let Some(cached) = entry.as_ref() {
            if now.duration_since(cached.fetched_at) < self.ttl {
                return Ok(cached.value.clone());
            }
        }

        match load().await {
            Ok(value) => {
                info!("Revalidated {} cache", self.name);
                *entry = Some(CacheEntry {
                    value: value.clone(),
                    fetched_at: now,
                });
                Ok(value)
            }
            Err(e) => match entry.as_mut() {
                Some(stale) => {
                    warn!("Failed to revalidate {} cache, serving stale value: {}", self.name, e);
                    stale.fetched_at = Instant::now();
                    Ok(stale.value.clone())
                }
                None => Err(e),
            },
        }
    }
}
