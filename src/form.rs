use crate::relay::Submission;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::fmt;
use tokio::sync::watch;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Message,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Name, Field::Email, Field::Message];

    /// JSON key and html input name.
    pub fn key(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Message => "message",
        }
    }

    pub fn input_type(self) -> &'static str {
        match self {
            Field::Email => "email",
            _ => "text",
        }
    }

    pub fn is_multiline(self) -> bool {
        self == Field::Message
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "Your Name",
            Field::Email => "Your Email",
            Field::Message => "Your Message",
        }
    }
}

/// Outcome of the last submission as shown under the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The relay answered `success: true`.
    Sent,
    /// The relay answered `success: false`.
    Failed,
    /// No usable answer, network or body parse failure.
    Errored,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Status::Sent => "✅ Email sent successfully!",
            Status::Failed => "❌ Failed to send email.",
            Status::Errored => "❌ Error sending email.",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Success,
    Failure,
    Neutral,
}

#[derive(Deserialize)]
struct Envelope {
    /// Absent counts as a failure.
    #[serde(default)]
    success: bool,
}

fn label_for(loading: bool) -> &'static str {
    if loading {
        "Sending..."
    } else {
        "Send Message"
    }
}

/// Clears the loading flag when dropped, whichever way submit ends.
struct Loading<'a>(&'a watch::Sender<bool>);

impl<'a> Loading<'a> {
    fn begin(flag: &'a watch::Sender<bool>) -> Self {
        flag.send_replace(true);
        Self(flag)
    }
}

impl Drop for Loading<'_> {
    fn drop(&mut self) {
        self.0.send_replace(false);
    }
}

/// Read side of the submit control, usable while a submit is in flight.
#[derive(Debug, Clone)]
pub struct SubmitButton(watch::Receiver<bool>);

impl SubmitButton {
    pub fn is_loading(&self) -> bool {
        *self.0.borrow()
    }

    pub fn enabled(&self) -> bool {
        !self.is_loading()
    }

    pub fn label(&self) -> &'static str {
        label_for(self.is_loading())
    }

    /// Waits for the next loading change, false once the form is gone.
    pub async fn changed(&mut self) -> bool {
        self.0.changed().await.is_ok()
    }
}

/// The contact form: three fields, a status line and a loading flag.
#[derive(Debug)]
pub struct ContactForm {
    fields: Submission,
    status: Option<Status>,
    loading: watch::Sender<bool>,
}

impl Default for ContactForm {
    fn default() -> Self {
        Self {
            fields: Submission::default(),
            status: None,
            loading: watch::channel(false).0,
        }
    }
}

impl ContactForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        *self.slot(field) = value.into();
    }

    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.fields.name,
            Field::Email => &self.fields.email,
            Field::Message => &self.fields.message,
        }
    }

    pub fn fields(&self) -> &Submission {
        &self.fields
    }

    pub fn status(&self) -> Option<Status> {
        self.status
    }

    pub fn is_loading(&self) -> bool {
        *self.loading.borrow()
    }

    /// The submit control is disabled while a send is in flight.
    pub fn can_submit(&self) -> bool {
        !self.is_loading()
    }

    pub fn submit_label(&self) -> &'static str {
        label_for(self.is_loading())
    }

    /// A handle on the submit control that follows the loading flag.
    pub fn submit_button(&self) -> SubmitButton {
        SubmitButton(self.loading.subscribe())
    }

    pub fn status_tone(&self) -> StatusTone {
        let Some(status) = self.status else {
            return StatusTone::Neutral;
        };
        let text = status.to_string();
        if text.contains('✅') {
            StatusTone::Success
        } else if text.contains('❌') {
            StatusTone::Failure
        } else {
            StatusTone::Neutral
        }
    }

    /// Posts the current fields as JSON to `endpoint`, one request per call.
    ///
    /// On `success: true` the fields are cleared, otherwise they are kept so
    /// the user can resend.
    pub async fn submit(&mut self, client: &Client, endpoint: &Url) -> Status {
        self.status = None;
        let _loading = Loading::begin(&self.loading);

        let status = match post(client, endpoint, &self.fields).await {
            Ok(Envelope { success: true }) => {
                self.fields = Submission::default();
                Status::Sent
            }
            Ok(Envelope { success: false }) => Status::Failed,
            Err(e) => {
                warn!(error = %e, "contact form submission failed");
                Status::Errored
            }
        };
        self.status = Some(status);
        status
    }

    fn slot(&mut self, field: Field) -> &mut String {
        match field {
            Field::Name => &mut self.fields.name,
            Field::Email => &mut self.fields.email,
            Field::Message => &mut self.fields.message,
        }
    }
}

async fn post(client: &Client, endpoint: &Url, fields: &Submission) -> reqwest::Result<Envelope> {
    debug!(%endpoint, "submitting contact form");
    // Status code is not looked at, only the envelope decides.
    client
        .post(endpoint.clone())
        .json(fields)
        .send()
        .await?
        .json::<Envelope>()
        .await
}
