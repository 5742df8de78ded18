use crate::mail::MailError;
use askama_axum::IntoResponse;
use axum::{http::StatusCode, Json};
use serde_json::json;
use tracing::error;

pub type AppResult<T> = Result<T, AppError>;

/// Failure of the relay, rendered as `{ "success": false, "error": .. }`.
///
/// Every cause collapses into the same path; only the status code could
/// differ and the relay always uses 500.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    error: MailError,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn mail_error(&self) -> &MailError {
        &self.error
    }
}

impl From<MailError> for AppError {
    fn from(value: MailError) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: value,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        MailError::from(value).into()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> askama_axum::Response {
        error!(error = %self.error, kind = self.error.name(), "Error sending email");
        (
            self.status,
            Json(json!({ "success": false, "error": self.error.to_json() })),
        )
            .into_response()
    }
}
