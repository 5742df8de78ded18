use crate::{
    config::MailConfig,
    errors::AppResult,
    mail::{EmailProvider, MailError, OutgoingEmail},
    metrics::{
        metric_counter, metric_gauge, metric_histogram, EMAILS_FAILED, EMAILS_SENT, SEND_SECONDS,
    },
};
use askama::Template;
use axum::{body::Bytes, Extension, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::{sync::Arc, time::Instant};
use tracing::info;

pub const SEND_EMAIL_PATH: &str = "/api/sendEmail";
pub const SUBJECT: &str = "✅ We received your message";

const SENDS_IN_FLIGHT: &str = "contact_email_sends_in_flight";

/// One form send. Fields are taken as is, nothing is validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Template)]
#[template(path = "confirmation.txt")]
struct Confirmation<'a> {
    name: &'a str,
    message: &'a str,
    signature: &'a str,
}

/// Composes the acknowledgment mail and hands it to the provider.
#[derive(Clone)]
pub struct Relay {
    provider: Arc<dyn EmailProvider>,
    sender: String,
    signature: String,
}

impl Relay {
    pub fn new(provider: Arc<dyn EmailProvider>, config: &MailConfig) -> Self {
        Self {
            provider,
            sender: config.sender.clone(),
            signature: config.signature.clone(),
        }
    }

    pub fn compose(&self, submission: &Submission) -> Result<OutgoingEmail, MailError> {
        let text = Confirmation {
            name: &submission.name,
            message: &submission.message,
            signature: &self.signature,
        }
        .render()
        .map_err(|e| MailError::Build(e.to_string()))?;
        Ok(OutgoingEmail {
            from: self.sender.clone(),
            to: submission.email.clone(),
            subject: SUBJECT.to_string(),
            text,
        })
    }

    /// Sends exactly once, no retry.
    ///
    /// The provider call runs on its own task, a client that goes away does
    /// not cancel a send already started.
    pub async fn relay(&self, submission: &Submission) -> Result<Value, MailError> {
        let email = self.compose(submission)?;
        let provider = Arc::clone(&self.provider);
        tokio::spawn(async move { send_measured(provider.as_ref(), &email).await })
            .await
            .map_err(|e| MailError::Transport(format!("send task failed: {e}")))?
    }
}

async fn send_measured(
    provider: &dyn EmailProvider,
    email: &OutgoingEmail,
) -> Result<Value, MailError> {
    let name = provider.name();
    let in_flight = metric_gauge(SENDS_IN_FLIGHT);
    in_flight.increment(1.0);
    let started = Instant::now();
    let result = provider.send(email).await;
    in_flight.decrement(1.0);
    metric_histogram(SEND_SECONDS, name).record(started.elapsed().as_secs_f64());
    match &result {
        Ok(_) => {
            metric_counter(EMAILS_SENT).increment(1);
            info!(provider = name, to = %email.to, "Email sent");
        }
        Err(_) => metric_counter(EMAILS_FAILED).increment(1),
    }
    result
}

/// `POST /api/sendEmail`
///
/// The body is parsed whatever the content type says, and a body that does
/// not parse goes down the same 500 path as a provider failure.
pub(crate) async fn send_email(
    Extension(relay): Extension<Relay>,
    body: Bytes,
) -> AppResult<Json<Value>> {
    let submission: Submission = serde_json::from_slice(&body)?;
    let user_mail = relay.relay(&submission).await?;
    Ok(Json(json!({ "success": true, "userMail": user_mail })))
}
