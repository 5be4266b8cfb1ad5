//! Logging setup

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install a `tracing` subscriber for the process
///
/// `RUST_LOG` wins when set; otherwise `default_filter` is used. Returns
/// `false` when another subscriber was already installed.
pub fn init_logging(default_filter: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .try_init()
        .is_ok()
}
