use anyhow::Result;
use clap::Parser;
use nic_upload::cli::{run, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    // .env may supply ACCESS_TOKEN
    dotenvy::dotenv().ok();

    // Initialize tracing for the CLI.
    tracing_subscriber::fmt::init();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "nic-upload starting");

    let cli = Cli::parse();
    let result = run(cli).await;
    match &result {
        Ok(_) => tracing::info!("nic-upload finished"),
        Err(e) => tracing::error!(error = %e, "nic-upload failed"),
    }
    result
}
