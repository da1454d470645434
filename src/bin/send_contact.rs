use anyhow::bail;
use clap::Parser;
use portfolio_contact::client::{ContactForm, HttpContactTransport, SubmissionOutcome};
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Parser)]
#[command(
    name = "send_contact",
    version,
    about = "Send a message through the portfolio contact form endpoint"
)]
struct Cli {
    /// Full URL of the contact endpoint
    #[arg(long, default_value = "http://127.0.0.1:8080/submit-contact", value_name = "URL")]
    endpoint: Url,

    #[arg(long)]
    name: String,

    #[arg(long)]
    email: String,

    #[arg(long)]
    message: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let transport = HttpContactTransport::new(cli.endpoint);
    let mut form = ContactForm::with_fields(cli.name, cli.email, cli.message);

    match form.submit(&transport).await {
        SubmissionOutcome::Sent { message } => {
            println!("{message}");
            Ok(())
        }
        SubmissionOutcome::Failed { message } | SubmissionOutcome::Rejected { message } => {
            bail!(message)
        }
    }
}
