//! Prometheus metrics for monitoring blackjack server health.
//!
//! Metrics are exposed in Prometheus text format at `http://<addr>/metrics`.
//! The directory is the single source of truth for room and session counts,
//! so the exporter samples it on an interval instead of instrumenting every
//! code path.
//!
//! # Metrics
//!
//! - `connections_accepted_total`: sessions registered since startup
//! - `rooms_active`: rooms currently in the directory
//! - `sessions_active`: sessions currently registered

use metrics_exporter_prometheus::PrometheusBuilder;
use private_blackjack::{Directory, room::directory::DirectoryStats};
use std::{net::SocketAddr, sync::Arc, time::Duration};

/// How often the directory is sampled.
pub const SAMPLE_INTERVAL: Duration = Duration::from_secs(5);

/// Initialize Prometheus metrics exporter.
///
/// Must be called from within a tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

/// Publish one directory sample.
pub fn record(stats: &DirectoryStats) {
    metrics::counter!("connections_accepted_total").absolute(stats.sessions_registered);
    metrics::gauge!("rooms_active").set(stats.rooms as f64);
    metrics::gauge!("sessions_active").set(stats.sessions as f64);
}

/// Sample `directory` forever.
pub async fn sample(directory: Arc<Directory>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        ticker.tick().await;
        record(&directory.stats().await);
    }
}
