use anyhow::Context;
use clap::Parser;
use desktop_sync_client::{cli, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    logging::init(&cli.log_filter, cli.log_json)?;
    cli::run(cli).await.context("desktop sync client failed")
}
