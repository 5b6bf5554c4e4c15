use anyhow::Context;
use genscan_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;

    // Initialize the application (telemetry, detector, routes)
    let (_state, router) = genscan_api::setup::initialize_app(config.clone()).await?;

    // Start the server
    genscan_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
