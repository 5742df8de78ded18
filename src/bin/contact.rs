use clap::Parser;
use contact_relay::prelude::*;
use std::process::ExitCode;

/// Send a contact form submission to a running relay.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Relay endpoint
    #[arg(
        long,
        env = "CONTACT_ENDPOINT",
        default_value = "http://localhost:8080/api/sendEmail"
    )]
    endpoint: Url,

    #[arg(long)]
    name: String,

    #[arg(long)]
    email: String,

    #[arg(long)]
    message: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut form = ContactForm::new();
    form.set(Field::Name, args.name);
    form.set(Field::Email, args.email);
    form.set(Field::Message, args.message);

    let status = form.submit(&client(), &args.endpoint).await;
    println!("{status}");
    match form.status_tone() {
        StatusTone::Success => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    }
}
