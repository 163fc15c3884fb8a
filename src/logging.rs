//! Tracing subscriber setup for the binary.

use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::params::LogConfig;

/// Install a stderr fmt subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. Calling this twice
/// is harmless; the second registration is ignored.
pub fn init(config: &LogConfig) {
    let filter = EnvFilter::builder()
        .parse_lossy(std::env::var("RUST_LOG").unwrap_or_else(|_| config.level.clone()));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr) // stdout is reserved for CLI output
        .with_ansi(config.ansi)
        .with_target(false);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .try_init();
}
