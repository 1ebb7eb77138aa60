//! Diagnostic logging to stderr, off unless asked for

use tracing_subscriber::EnvFilter;

use crate::core::Config;

/// Install the global `tracing` subscriber.
///
/// The filter comes from the `log` config key (which `UNIXKIT_LOG`
/// overrides); without one nothing is logged, so utility output stays
/// byte-for-byte what the user expects. Safe to call more than once.
pub fn init(config: &Config) {
    let Some(directive) = config.log.as_deref().filter(|d| !d.trim().is_empty()) else {
        return;
    };

    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
