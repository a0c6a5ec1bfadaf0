//! Subscriber setup for the `plancc` binary

use crate::config::LogConfig;
use tracing_subscriber::EnvFilter;

/// Error returned when a global subscriber is already installed
pub type InitError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Install the global subscriber, writing to stderr
///
/// `RUST_LOG` takes precedence over the configured filter.
///
/// # Errors
/// Returns [`InitError`] if a global subscriber is already installed.
pub fn init(config: &LogConfig) -> Result<(), InitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    }
}
