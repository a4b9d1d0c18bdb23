use anyhow::{anyhow, Context};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global subscriber, writing to stderr so stdout stays machine-readable.
///
/// # Errors
///
/// Fails when the filter does not parse or a subscriber is already installed.
pub fn init(default_filter: &str, json: bool) -> anyhow::Result<()> {
    let filter = match std::env::var("RUST_LOG") {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(directives),
        _ => EnvFilter::try_new(default_filter),
    }
    .context("invalid log filter")?;

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };
    installed.map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))
}
