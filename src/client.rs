/// Create a new http client to inject into the application or to drive a
/// [`crate::prelude::ContactForm`] with.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_default()
}
