//! CMS content client
//!
//! This module fetches the site labels and the agent page content from the
//! Strapi backend. Both are read-only and revalidated on a fixed interval,
//! so a burst of page renders results in a single upstream call.

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{error, info};

use crate::{
    cache::RevalidatingCache,
    error::{ClientError, ClientResult},
    http::join_url,
};

/// Default CMS location
pub const DEFAULT_CMS_URL: &str = "https://api.itfolkstech.com";

/// Configuration for the CMS connection
#[derive(Debug, Clone)]
pub struct CmsConfig {
    /// Base URL of the Strapi instance
    pub base_url: String,
    /// How long fetched content is served before it is refetched
    pub revalidate: Duration,
}

impl CmsConfig {
    /// Create a new CmsConfig from environment variables
    ///
    /// # Environment Variables
    /// - `STRAPI_URL`: CMS base URL (default: "https://api.itfolkstech.com")
    /// - `CMS_REVALIDATE_SECONDS`: Revalidation interval (default: 60)
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("STRAPI_URL").unwrap_or_else(|_| DEFAULT_CMS_URL.to_string());
        let revalidate_seconds = std::env::var("CMS_REVALIDATE_SECONDS")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .unwrap_or(60);

        Ok(CmsConfig {
            base_url,
            revalidate: Duration::from_secs(revalidate_seconds),
        })
    }
}

/// Key/value display strings managed in the CMS
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteLabels {
    entries: Map<String, Value>,
}

impl SiteLabels {
    /// Build labels from the `data` member of the CMS response
    ///
    /// Accepts both the flat shape and the `attributes`-wrapped one.
    pub fn from_data(data: Value) -> Self {
        let entries = match unwrap_attributes(data) {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self { entries }
    }

    /// Non-blank label text for `key`, trimmed
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Label text for `key`, or `fallback` when the CMS has none
    pub fn text_or(&self, key: &str, fallback: &str) -> String {
        self.get(key).unwrap_or(fallback).to_string()
    }
}

/// Dynamic content for the agent page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentContent {
    fields: Map<String, Value>,
    quick_examples: Vec<Value>,
    how_it_works: Option<String>,
}

impl AgentContent {
    /// Build the content from the first entry of the collection
    ///
    /// Returns `None` when the entry has no `AgentITFolksContent` block.
    pub fn from_entry(entry: Value) -> Option<Self> {
        let entry = match unwrap_attributes(entry) {
            Value::Object(map) => map,
            _ => return None,
        };

        let fields = match entry.get("AgentITFolksContent")?.as_array()?.first()? {
            Value::Object(map) => map.clone(),
            _ => return None,
        };

        let quick_examples = entry
            .get("quickExample")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let how_it_works = entry.get("comoFunciona").and_then(plain_text);

        Some(Self {
            fields,
            quick_examples,
            how_it_works,
        })
    }

    /// Non-blank string field of the content block
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Subtitle shown under the page title
    pub fn subtitle(&self) -> Option<&str> {
        self.field("subITFolks")
    }

    /// Raw quick-example entries, in CMS order
    pub fn quick_examples(&self) -> &[Value] {
        &self.quick_examples
    }

    /// "How it works" copy flattened to plain text
    pub fn how_it_works(&self) -> Option<&str> {
        self.how_it_works.as_deref()
    }
}

/// Source of CMS-managed page content
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn site_labels(&self) -> ClientResult<SiteLabels>;

    async fn agent_content(&self) -> ClientResult<Option<AgentContent>>;
}

#[derive(Deserialize)]
struct DataEnvelope {
    #[serde(default)]
    data: Value,
}

/// Strapi-backed content source with per-resource revalidation
#[derive(Clone)]
pub struct CmsClient {
    base_url: String,
    http: reqwest::Client,
    labels: RevalidatingCache<SiteLabels>,
    agent: RevalidatingCache<Option<AgentContent>>,
}

impl CmsClient {
    /// Create a new CMS client
    pub fn new(config: &CmsConfig, http: reqwest::Client) -> Self {
        info!("CMS client initialized with URL: {}", config.base_url);
        Self {
            base_url: config.base_url.clone(),
            http,
            labels: RevalidatingCache::new("site labels", config.revalidate),
            agent: RevalidatingCache::new("agent content", config.revalidate),
        }
    }

    /// Fetch the `data` member of a collection or single type
    async fn fetch_data(&self, resource: &str) -> ClientResult<Value> {
        let url = join_url(&self.base_url, &format!("api/{}", resource));

        let response = self
            .http
            .get(&url)
            .query(&[("populate", "*")])
            .send()
            .await
            .map_err(|e| {
                error!("Failed to fetch {}: {}", resource, e);
                ClientError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            error!("CMS returned {} for {}", status, resource);
            return Err(ClientError::Status(status.as_u16()));
        }

        let envelope: DataEnvelope = response.json().await?;
        Ok(envelope.data)
    }

    async fn load_labels(&self) -> ClientResult<SiteLabels> {
        let data = self.fetch_data("site-ui-label").await?;
        Ok(SiteLabels::from_data(data))
    }

    async fn load_agent_content(&self) -> ClientResult<Option<AgentContent>> {
        let data = self.fetch_data("agent-it-folks-contents").await?;
        let first = match data {
            Value::Array(mut entries) if !entries.is_empty() => entries.swap_remove(0),
            _ => return Ok(None),
        };
        Ok(AgentContent::from_entry(first))
    }
}

#[async_trait]
impl ContentSource for CmsClient {
    async fn site_labels(&self) -> ClientResult<SiteLabels> {
        self.labels.get_or_refresh(|| self.load_labels()).await
    }

    async fn agent_content(&self) -> ClientResult<Option<AgentContent>> {
        self.agent.get_or_refresh(|| self.load_agent_content()).await
    }
}

/// Strip the v4-style `{ id, attributes: {...} }` wrapper if present
fn unwrap_attributes(value: Value) -> Value {
    match value {
        Value::Object(mut map) => match map.remove("attributes") {
            Some(Value::Object(attributes)) => Value::Object(attributes),
            Some(other) => {
                map.insert("attributes".to_string(), other);
                Value::Object(map)
            }
            None => Value::Object(map),
        },
        other => other,
    }
}

/// Flatten a string or a rich-text block tree into plain text
fn plain_text(value: &Value) -> Option<String> {
    fn collect(value: &Value, out: &mut Vec<String>) {
        match value {
            Value::String(s) => {
                let s = s.trim();
                if !s.is_empty() {
                    out.push(s.to_string());
                }
            }
            Value::Array(items) => items.iter().for_each(|item| collect(item, out)),
            Value::Object(map) => {
                if let Some(text) = map.get("text") {
                    collect(text, out);
                }
                if let Some(children) = map.get("children") {
                    collect(children, out);
                }
            }
            _ => {}
        }
    }

    let mut parts = Vec::new();
    collect(value, &mut parts);
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}
