use anyhow::Context;
use clap::Parser;

mod config;
mod core;
mod logging;
mod processors;

use crate::config::{ApiKey, Config};
use crate::core::Bridge;
use crate::processors::input::BusListener;
use crate::processors::output::{ConsoleReporter, FeedForwarder};
use crate::processors::transform::Route;

/// feedbridge - forwards 1-wire sensor readings from MQTT to a feed service
#[derive(Parser)]
#[command(name = "feedbridge")]
#[command(version)]
#[command(about = "Forwards one MQTT sensor topic to a Pachube-style feed datastream")]
#[command(long_about =
"Subscribes to the 1-wire topics on an MQTT broker, prints every reading
and PUTs the routed sensor's value to a remote feed datastream.

The feed service API key is read from PACHUBE_API_KEY.")]
struct Cli {
    /// Optional configuration file overriding the built-in defaults
    #[arg(short, long)]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging with specified level
    logging::init_logging(&cli.log_level);

    // The credential must be present before anything touches the network
    let (config, api_key) = match startup(&cli, |name| std::env::var(name).ok()) {
        Ok(prepared) => prepared,
        Err(e) => {
            tracing::error!("Error: {e:#}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(config, api_key).await {
        tracing::error!("{e:#}");
        std::process::exit(1);
    }
}

/// Loads and validates the configuration, then captures the API key through `lookup`.
fn startup<F>(cli: &Cli, lookup: F) -> anyhow::Result<(Config, ApiKey)>
where
    F: FnOnce(&str) -> Option<String>,
{
    // Load configuration, falling back to the built-in defaults
    let config = match &cli.config {
        Some(path) => config::load_config(path)
            .with_context(|| format!("Failed to load config from '{path}'"))?,
        None => Config::default(),
    };

    config::validate_config(&config).context("Configuration error")?;

    let api_key = ApiKey::from_lookup(&config.feed_service.api_key_env, lookup)?;
    Ok((config, api_key))
}

async fn run(config: Config, api_key: ApiKey) -> anyhow::Result<()> {
    let forwarder = FeedForwarder::new(&config.feed_service, api_key)?;
    let listener = BusListener::connect(&config.broker).await?;
    let route = Route::from_config(&config.route);

    let bridge = Bridge::new(listener, forwarder, route, ConsoleReporter::stdout());

    bridge
        .run(async {
            if let Err(e) = crate::core::shutdown::wait_for_signal().await {
                tracing::error!("Failed to install signal handlers: {e}");
                std::future::pending::<()>().await;
            }
        })
        .await
}
