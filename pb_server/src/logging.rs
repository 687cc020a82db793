//! Structured logging configuration.
//!
//! The library logs through the `log` facade; those records are bridged into
//! the `tracing` subscriber installed here.

use std::net::SocketAddr;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured logging
///
/// Log levels are configurable via the `RUST_LOG` env var and default to
/// `info`.
///
/// # Example
///
/// ```no_run
/// use pb_server::logging;
///
/// logging::init();
/// tracing::info!("Server starting");
/// ```
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true);

    // `init` also installs the `log` bridge.
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::debug!("Structured logging initialized");
}

/// Log the effective listener layout once at startup.
pub fn log_listeners(game: SocketAddr, discovery_port: Option<u16>, metrics: Option<SocketAddr>) {
    tracing::info!(
        game = %game,
        discovery_port = discovery_port,
        metrics = ?metrics,
        "Listeners configured"
    );
}
