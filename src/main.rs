use contact_relay::prelude::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app = App::new();
    let server = ServerConfig::from_env()?;
    let mail = MailConfig::from_env()?;
    if mail.provider == ProviderKind::Resend && mail.resend.api_key.is_none() {
        warn!("RESEND_KEY is not set, every send will fail");
    }
    let provider = provider_from_config(&mail)?;
    info!(provider = provider.name(), sender = %mail.sender, "Mail relay configured");
    app.contact(Relay::new(provider, &mail)).start(server).await
}
