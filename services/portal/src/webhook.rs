//! Lead-search webhook client

use async_trait::async_trait;
use common::error::{ClientError, ClientResult};
use tracing::{error, info};

use crate::search::SearchCriteria;

/// Production n8n workflow receiving lead searches
pub const DEFAULT_WEBHOOK_URL: &str =
    "https://n8n.itfolkstech.com/webhook/abe18e3c-e8d0-4cd7-b3b8-53b9abf0697f";

/// Receiver of lead-search criteria
#[async_trait]
pub trait LeadWebhook: Send + Sync {
    /// POST the criteria; any non-2xx status is an error
    async fn submit(&self, criteria: &SearchCriteria) -> ClientResult<()>;
}

/// n8n workflow webhook
#[derive(Clone)]
pub struct N8nWebhook {
    url: String,
    http: reqwest::Client,
}

impl N8nWebhook {
    pub fn new(url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            http,
        }
    }
}

#[async_trait]
impl LeadWebhook for N8nWebhook {
    async fn submit(&self, criteria: &SearchCriteria) -> ClientResult<()> {
        let response = self
            .http
            .post(&self.url)
            .json(criteria)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to reach lead-search webhook: {}", e);
                ClientError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            error!("Lead-search webhook returned {}", status);
            return Err(ClientError::Status(status.as_u16()));
        }

        info!("Lead search accepted by webhook");
        Ok(())
    }
}

/// User-facing description of a failed submission
pub fn describe_failure(err: &ClientError) -> String {
    match err {
        ClientError::Status(code) => format!("Erro HTTP: {}", code),
        ClientError::Transport(_) => "Falha de conexão com o servidor. Tente novamente.".to_string(),
        ClientError::Decode(_) | ClientError::Configuration(_) => {
            "Erro desconhecido. Tente novamente.".to_string()
        }
    }
}
