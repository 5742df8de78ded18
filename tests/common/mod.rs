#![allow(dead_code)]

use contact_relay::prelude::*;
use serde_json::{json, Value};
use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

/// Provider double: records every email and answers with a fixed outcome.
pub struct FakeProvider {
    outcome: fn() -> Result<Value, MailError>,
    delay: Duration,
    pub sent: Mutex<Vec<OutgoingEmail>>,
    completed: AtomicUsize,
}

impl FakeProvider {
    pub fn accepting() -> Arc<Self> {
        Arc::new(Self {
            outcome: || Ok(json!({"id": "49a3999c-0ce1-4ea6-ab68-afcd6dc2e794"})),
            delay: Duration::ZERO,
            sent: Mutex::new(vec![]),
            completed: AtomicUsize::new(0),
        })
    }

    pub fn rejecting() -> Arc<Self> {
        Arc::new(Self {
            outcome: || {
                Err(MailError::Rejected {
                    status: 403,
                    name: "validation_error".into(),
                    message: "You can only send testing emails to your own email address".into(),
                })
            },
            delay: Duration::ZERO,
            sent: Mutex::new(vec![]),
            completed: AtomicUsize::new(0),
        })
    }

    /// Accepts, but only after `delay`.
    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            outcome: || Ok(json!({"id": "slow"})),
            delay,
            sent: Mutex::new(vec![]),
            completed: AtomicUsize::new(0),
        })
    }

    /// Sends that ran to the end.
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl EmailProvider for FakeProvider {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn send(&self, email: &OutgoingEmail) -> Result<Value, MailError> {
        self.sent.lock().unwrap().push(email.clone());
        tokio::time::sleep(self.delay).await;
        self.completed.fetch_add(1, Ordering::SeqCst);
        (self.outcome)()
    }
}

pub fn app(provider: Arc<dyn EmailProvider>) -> App {
    App::new().contact(Relay::new(provider, &MailConfig::default()))
}

pub fn ana() -> Value {
    json!({"name": "Ana", "email": "ana@x.com", "message": "Hi"})
}
