//! Tracing setup for the `lumen` binary.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_level` (the config file's
/// `log_level`) is used. A bad `default_level` falls back to `info`.
///
/// # Errors
/// Returns an error if a subscriber is already installed.
pub fn init(default_level: &str, json: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true);

    if json {
        builder
            .json()
            .try_init()
            .map_err(|e| anyhow::anyhow!("installing log subscriber: {e}"))
    } else {
        builder
            .compact()
            .try_init()
            .map_err(|e| anyhow::anyhow!("installing log subscriber: {e}"))
    }
}
