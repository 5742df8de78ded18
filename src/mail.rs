mod resend;
mod smtp;

pub use resend::ResendProvider;
pub use smtp::SmtpProvider;

use crate::config::{MailConfig, ProviderKind};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;

/// A provider neutral message, exactly what gets handed to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
}

/// Something that can deliver an [`OutgoingEmail`].
///
/// The returned value is the provider's confirmation, passed back to the
/// caller untouched.
#[async_trait]
pub trait EmailProvider: Send + Sync + 'static {
    /// Short name used in logs and metric labels.
    fn name(&self) -> &'static str;

    async fn send(&self, email: &OutgoingEmail) -> Result<Value, MailError>;
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid request body: {0}")]
    Body(String),

    #[error("missing API key, set RESEND_KEY")]
    MissingApiKey,

    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("provider rejected the message ({status}): {message}")]
    Rejected {
        status: u16,
        name: String,
        message: String,
    },

    #[error("transport error: {0}")]
    Transport(String),
}

impl MailError {
    pub fn name(&self) -> &'static str {
        match self {
            MailError::Body(_) => "invalid_body",
            MailError::MissingApiKey => "missing_api_key",
            MailError::InvalidAddress(_) => "invalid_address",
            MailError::Build(_) => "build_error",
            MailError::Rejected { .. } => "provider_rejected",
            MailError::Transport(_) => "transport_error",
        }
    }

    /// Error object sent back in the failure envelope.
    pub fn to_json(&self) -> Value {
        match self {
            MailError::Rejected {
                status,
                name,
                message,
            } => json!({
                "name": name,
                "message": message,
                "statusCode": status,
            }),
            other => json!({
                "name": other.name(),
                "message": other.to_string(),
            }),
        }
    }
}

impl From<serde_json::Error> for MailError {
    fn from(value: serde_json::Error) -> Self {
        MailError::Body(value.to_string())
    }
}

impl From<reqwest::Error> for MailError {
    fn from(value: reqwest::Error) -> Self {
        MailError::Transport(value.to_string())
    }
}

/// Builds the provider selected by `MAIL_PROVIDER`.
pub fn provider_from_config(config: &MailConfig) -> anyhow::Result<Arc<dyn EmailProvider>> {
    Ok(match config.provider {
        ProviderKind::Resend => Arc::new(ResendProvider::new(
            crate::client::client(),
            config.resend.clone(),
        )),
        ProviderKind::Smtp => {
            let smtp = config
                .smtp
                .clone()
                .ok_or_else(|| anyhow::anyhow!("smtp provider selected without MAIL_HOST"))?;
            Arc::new(SmtpProvider::new(smtp)?)
        }
    })
}
