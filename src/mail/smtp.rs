use super::{EmailProvider, MailError, OutgoingEmail};
use crate::config::SmtpConfig;
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

/// Sends over SMTP with implicit TLS, port 465 unless configured otherwise.
#[derive(Clone)]
pub struct SmtpProvider {
    transport: Arc<AsyncSmtpTransport<Tokio1Executor>>,
}

impl SmtpProvider {
    pub fn new(config: SmtpConfig) -> anyhow::Result<Self> {
        // Both ring and aws-lc end up linked, rustls needs to be told which one to use.
        // Already installed is fine.
        rustls::crypto::ring::default_provider()
            .install_default()
            .ok();
        let mut tls = TlsParameters::builder(config.host.clone());
        if config.accept_invalid_certs {
            warn!("Accepting invalid certs for smtp, use only for dev");
            tls = tls
                .dangerous_accept_invalid_certs(true)
                .dangerous_accept_invalid_hostnames(true);
        }
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
            .tls(Tls::Wrapper(tls.build()?))
            .port(config.port);
        if let Some((username, password)) = config.credentials {
            builder = builder.credentials(Credentials::new(username, password));
        }
        Ok(Self {
            transport: Arc::new(builder.build()),
        })
    }
}

fn mailbox(address: &str) -> Result<Mailbox, MailError> {
    address
        .parse()
        .map_err(|_| MailError::InvalidAddress(address.to_string()))
}

fn build_message(email: &OutgoingEmail) -> Result<Message, MailError> {
    Message::builder()
        .from(mailbox(&email.from)?)
        .to(mailbox(&email.to)?)
        .subject(&email.subject)
        .header(ContentType::TEXT_PLAIN)
        .body(email.text.clone())
        .map_err(|e| MailError::Build(e.to_string()))
}

#[async_trait]
impl EmailProvider for SmtpProvider {
    fn name(&self) -> &'static str {
        "smtp"
    }

    async fn send(&self, email: &OutgoingEmail) -> Result<Value, MailError> {
        let message = build_message(email)?;
        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;
        Ok(json!({
            "code": response.code().to_string(),
            "message": response.message().collect::<Vec<_>>(),
        }))
    }
}
