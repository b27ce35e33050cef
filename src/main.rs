use std::path::PathBuf;
use std::sync::Arc;
use product_scraper::api;
use product_scraper::config::{ConfigManager, FileConfigManager};
use product_scraper::sites::{supported_domains, Dispatcher};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> product_scraper::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_path = std::env::var("SCRAPER_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));
    let config_manager = FileConfigManager::new(config_path);

    let mut config = config_manager.load_config().await?;
    config.apply_port_override(std::env::var("PORT").ok().as_deref())?;
    config_manager.validate_config(&config)?;

    tracing::info!("Starting product scraper for {}", supported_domains().join(", "));

    let dispatcher = Arc::new(Dispatcher::from_config(&config)?);
    if let Err(e) = api::start_api_server(dispatcher, Arc::new(config)).await {
        tracing::error!("API server stopped: {}", e);
        return Err(e);
    }

    tracing::info!("Product scraper stopped.");
    Ok(())
}
