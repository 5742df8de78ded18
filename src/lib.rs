mod app;
mod client;
mod config;
mod errors;
mod form;
mod mail;
mod metrics;
mod relay;

#[macro_use]
pub mod prelude {
    pub use crate::app::App;
    pub use crate::client::client;
    pub use crate::config::{MailConfig, ProviderKind, ResendConfig, ServerConfig, SmtpConfig};
    pub use crate::errors::{AppError, AppResult};
    pub use crate::form::{ContactForm, Field, Status, StatusTone, SubmitButton};
    pub use crate::mail::{
        provider_from_config, EmailProvider, MailError, OutgoingEmail, ResendProvider,
        SmtpProvider,
    };
    pub use crate::metrics::{metric_counter, metric_gauge, metric_histogram};
    pub use crate::relay::{Relay, Submission, SEND_EMAIL_PATH, SUBJECT};

    pub use askama::Template;
    pub use askama_axum::IntoResponse;
    pub use axum::extract::Json;
    pub use axum::http::StatusCode;
    pub use axum::routing::{get, post};
    pub use axum::{Extension, Router};
    pub use reqwest::{Client, Url};
    pub use rust_embed::RustEmbed;
    pub use serde::{Deserialize, Serialize};
    pub use tracing::{debug, error, info, trace, warn};
}
