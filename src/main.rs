use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use library_seat_booker::{AffluencesClient, BookingConfig, Orchestrator};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load the API settings and reservation plan once, read-only afterwards
    let config = match BookingConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Startup failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let client = match AffluencesClient::new(&config.api) {
        Ok(client) => client,
        Err(e) => {
            error!("Startup failed: {}", e);
            return ExitCode::FAILURE;
        }
    };
    info!("Using booking API at {}", client.endpoint());

    let orchestrator = Orchestrator::new(&client, &config.plan, config.date);
    match orchestrator.run().await {
        Ok(_) => {
            info!("Done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Run aborted: {}", e);
            ExitCode::FAILURE
        }
    }
}
