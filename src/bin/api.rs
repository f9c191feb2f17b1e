use fincoach_engine::{api::start_server, config::EngineConfig, FinCoachEngine};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = EngineConfig::from_env()?;
    let port = config.port;

    info!("FinCoach Engine - API Server");
    info!("Port: {}", port);

    let engine = Arc::new(FinCoachEngine::from_config(config)?);

    info!("Engine initialized, starting API server");

    start_server(engine, port).await?;

    Ok(())
}
