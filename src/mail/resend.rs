use super::{EmailProvider, MailError, OutgoingEmail};
use crate::config::ResendConfig;
use async_trait::async_trait;
use reqwest::{header::AUTHORIZATION, Client};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// Sends through the Resend http API, `POST {base_url}/emails`.
#[derive(Clone)]
pub struct ResendProvider {
    client: Client,
    config: ResendConfig,
}

/// Error body returned by Resend on non 2xx responses.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResendFailure {
    status_code: Option<u16>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ResendProvider {
    pub fn new(client: Client, config: ResendConfig) -> Self {
        Self { client, config }
    }

    fn endpoint(&self) -> String {
        format!("{}/emails", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl EmailProvider for ResendProvider {
    fn name(&self) -> &'static str {
        "resend"
    }

    async fn send(&self, email: &OutgoingEmail) -> Result<Value, MailError> {
        let Some(key) = self.config.api_key.as_deref() else {
            return Err(MailError::MissingApiKey);
        };
        debug!(to = %email.to, "posting email to resend");
        let response = self
            .client
            .post(self.endpoint())
            .header(AUTHORIZATION, format!("Bearer {key}"))
            .json(email)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            return serde_json::from_str(&body)
                .map_err(|e| MailError::Transport(format!("unreadable provider response: {e}")));
        }
        let failure = serde_json::from_str::<ResendFailure>(&body).ok();
        Err(MailError::Rejected {
            status: failure
                .as_ref()
                .and_then(|f| f.status_code)
                .unwrap_or(status.as_u16()),
            name: failure
                .as_ref()
                .and_then(|f| f.name.clone())
                .unwrap_or_else(|| "application_error".into()),
            message: failure
                .and_then(|f| f.message)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("").to_string()),
        })
    }
}
