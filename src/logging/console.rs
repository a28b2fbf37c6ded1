use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

/// Installs the global subscriber. `RUST_LOG` takes precedence over `default_level`.
///
/// Diagnostics go to stderr so stdout carries only the bridge's console lines.
pub fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .compact()
        .init();
}
