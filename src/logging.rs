//! Tracing subscriber setup for the binary
//!
//! The library only emits events; installing a subscriber is left to the
//! program that embeds it.

use tracing_subscriber::EnvFilter;

/// Filter directive from, in order: `RUST_LOG`, `--verbose`, the configured level.
pub fn filter(config_level: &str, verbose: bool) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let level = if verbose { "debug" } else { config_level };
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Install a compact stderr subscriber. Later calls are no-ops.
pub fn init(config_level: &str, verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(config_level, verbose))
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}
