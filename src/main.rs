use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    concierge::startup::init_logging()?;

    info!("Starting concierge backend");

    // Load configuration
    let config = concierge::startup::load_config().await?;

    // Start the server
    concierge::startup::start_server(config).await
}
