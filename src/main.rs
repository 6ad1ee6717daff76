use std::error::Error;

use gemini_prompt_relay::{logging::configure_logging, server, RelayConfig};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();
    configure_logging()?;

    let config = RelayConfig::from_env()?;
    info!(?config, "configuration loaded");
    if config.api_key().is_none() {
        warn!("GEMINI_API_KEY is not set; every prompt will fail with a configuration error");
    }

    server::serve(config).await?;
    Ok(())
}
