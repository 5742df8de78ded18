use anyhow::{bail, Context};
use std::{env, net::SocketAddr, str::FromStr};

pub const DEFAULT_SENDER: &str = "Contact Desk <onboarding@resend.dev>";
pub const DEFAULT_RESEND_URL: &str = "https://api.resend.com";

/// Where and how the http server listens.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    /// `(pem_cert, pem_key)` paths when TLS is on
    pub tls: Option<(String, String)>,
    pub sentry_url: Option<String>,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let bind = env::var("SERVER_BIND").unwrap_or("0.0.0.0".into());
        let port = env::var("SERVER_PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(8080);
        let tls = if env::var("TLS").is_ok() {
            let cert = env::var("TLS_PEM_CERT").context("TLS is set but TLS_PEM_CERT is not")?;
            let key = env::var("TLS_PEM_KEY").context("TLS is set but TLS_PEM_KEY is not")?;
            Some((cert, key))
        } else {
            None
        };
        Ok(Self {
            bind,
            port,
            tls,
            sentry_url: env::var("SENTRY_URL").ok(),
        })
    }

    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.bind, self.port);
        SocketAddr::from_str(&addr).with_context(|| format!("invalid bind address {addr}"))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".into(),
            port: 8080,
            tls: None,
            sentry_url: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    #[default]
    Resend,
    Smtp,
}

impl FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "resend" => Ok(Self::Resend),
            "smtp" => Ok(Self::Smtp),
            other => bail!("unknown MAIL_PROVIDER {other}, expected resend or smtp"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResendConfig {
    /// Missing key is not a startup error, every send fails instead
    pub api_key: Option<String>,
    pub base_url: String,
}

impl Default for ResendConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_RESEND_URL.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub credentials: Option<(String, String)>,
    pub accept_invalid_certs: bool,
}

/// Everything the relay needs to build and send the acknowledgment mail.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub provider: ProviderKind,
    pub sender: String,
    pub signature: String,
    pub resend: ResendConfig,
    pub smtp: Option<SmtpConfig>,
}

impl MailConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let provider = match env::var("MAIL_PROVIDER") {
            Ok(s) => s.parse()?,
            Err(_) => ProviderKind::default(),
        };
        let sender = env::var("MAIL_FROM").unwrap_or(DEFAULT_SENDER.into());
        let signature = env::var("MAIL_SIGNATURE").unwrap_or_else(|_| display_name(&sender));
        let resend = ResendConfig {
            api_key: env::var("RESEND_KEY").ok().filter(|k| !k.is_empty()),
            base_url: env::var("RESEND_API_URL").unwrap_or(DEFAULT_RESEND_URL.into()),
        };
        let smtp = match env::var("MAIL_HOST") {
            Ok(host) => Some(SmtpConfig {
                host,
                port: match env::var("MAIL_PORT") {
                    Ok(port) => port.parse().context("MAIL_PORT is not a port number")?,
                    Err(_) => 465,
                },
                credentials: env::var("MAIL_USERNAME")
                    .ok()
                    .zip(env::var("MAIL_PASSWORD").ok()),
                accept_invalid_certs: env::var("MAIL_ACCEPT_INVALID_CERTS")
                    .map(|s| s.parse::<bool>().unwrap_or(false))
                    .unwrap_or(false),
            }),
            Err(_) => None,
        };
        if provider == ProviderKind::Smtp && smtp.is_none() {
            bail!("MAIL_PROVIDER=smtp requires MAIL_HOST");
        }
        Ok(Self {
            provider,
            sender,
            signature,
            resend,
            smtp,
        })
    }

    /// Resend backed config, handy for tests and embedding.
    pub fn resend(api_key: Option<&str>, base_url: &str) -> Self {
        Self {
            provider: ProviderKind::Resend,
            sender: DEFAULT_SENDER.into(),
            signature: display_name(DEFAULT_SENDER),
            resend: ResendConfig {
                api_key: api_key.map(str::to_string),
                base_url: base_url.into(),
            },
            smtp: None,
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self::resend(None, DEFAULT_RESEND_URL)
    }
}

/// `"Name <addr>"` gives `Name`, a bare address is returned as is.
fn display_name(mailbox: &str) -> String {
    match mailbox.split_once('<') {
        Some((name, _)) if !name.trim().is_empty() => name.trim().trim_matches('"').to_string(),
        _ => mailbox.trim().to_string(),
    }
}
