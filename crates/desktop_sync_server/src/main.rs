use clap::Parser;
use desktop_sync_server::{logging, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    logging::init(&config.log_filter, config.log_json)?;
    desktop_sync_server::run(config).await
}
