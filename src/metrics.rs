use axum_prometheus::metrics::{Counter, Gauge, Histogram};

pub(crate) const EMAILS_SENT: &str = "contact_emails_sent";
pub(crate) const EMAILS_FAILED: &str = "contact_emails_failed";
pub(crate) const SEND_SECONDS: &str = "contact_email_send_seconds";

/// Gets a prometheus counter
pub fn metric_counter(name: &'static str) -> Counter {
    axum_prometheus::metrics::counter!(name)
}

/// Gets a prometheus gauge
pub fn metric_gauge(name: &'static str) -> Gauge {
    axum_prometheus::metrics::gauge!(name)
}

/// Gets a prometheus histogram, labelled by provider
pub fn metric_histogram(name: &'static str, provider: &'static str) -> Histogram {
    axum_prometheus::metrics::histogram!(name, "provider" => provider)
}
