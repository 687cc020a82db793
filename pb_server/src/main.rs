//! Multi-room blackjack server using one worker task per room.
//!
//! Accepts TCP connections into a shared lobby and answers UDP discovery
//! probes so clients on the local network can find it.

mod config;
mod logging;
mod metrics;

use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Error};
use log::{info, warn};
use pico_args::Arguments;
use private_blackjack::{Directory, net::discovery, net::server};
use tokio::net::{TcpListener, UdpSocket};

use config::{Overrides, ServerConfig};

const HELP: &str = "\
Run a multi-room private blackjack server

USAGE:
  pb_server [OPTIONS]

OPTIONS:
  --bind            IP:PORT  Server socket bind address   [default: env SERVER_BIND or 0.0.0.0:2928]
  --discovery-port  PORT     UDP discovery port, 0 = off  [default: env DISCOVERY_PORT or 2927]
  --seats           N        Seats per room               [default: env ROOM_SEATS or 2]
  --metrics         IP:PORT  Prometheus listener address  [default: env METRICS_BIND, off if unset]

FLAGS:
  -h, --help                 Print help information

ENVIRONMENT:
  ROOM_DECKS                 Decks per shoe
  STARTING_MONEY             Balance given to every seated player
  PITY_MONEY                 Balance a broke player is reset to
  ACTION_TIMEOUT_SECS        Seconds to wait for a player, 0 = forever
  SHUFFLE_SEED               Seed for reproducible shoes
  RUST_LOG                   Log filter (e.g., debug)
  (A .env file in the working directory is loaded first)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let overrides = Overrides {
        bind: pargs.opt_value_from_str("--bind")?,
        discovery_port: pargs.opt_value_from_str("--discovery-port")?,
        seats: pargs.opt_value_from_str("--seats")?,
        metrics_bind: pargs.opt_value_from_str("--metrics")?,
    };

    let config = ServerConfig::from_env(overrides)?;
    config.validate()?;

    logging::init();
    logging::log_listeners(config.bind, config.discovery_port, config.metrics_bind);

    let directory = Arc::new(Directory::new(config.room.clone()));

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(|e| anyhow::anyhow!(e))?;
        tokio::spawn(metrics::sample(Arc::clone(&directory), metrics::SAMPLE_INTERVAL));
        info!("Prometheus metrics at http://{addr}/metrics");
    }

    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("couldn't bind {}", config.bind))?;
    let game_port = listener.local_addr()?.port();

    if let Some(port) = config.discovery_port {
        spawn_discovery(port, game_port).await?;
    }

    info!(
        "Starting blackjack server at {} ({} seats per room)",
        config.bind, config.room.seats
    );

    tokio::select! {
        () = server::run(listener, Arc::clone(&directory)) => {}
        () = shutdown_signal() => {}
    }

    let stats = directory.stats().await;
    info!(
        "Shutting down with {} room(s) and {} session(s) open",
        stats.rooms, stats.sessions
    );
    Ok(())
}

async fn spawn_discovery(port: u16, game_port: u16) -> Result<(), Error> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let socket = UdpSocket::bind(addr)
        .await
        .with_context(|| format!("couldn't bind discovery socket {addr}"))?;
    info!("Answering discovery probes on udp/{port}");
    tokio::spawn(async move {
        if let Err(error) = discovery::serve(socket, game_port).await {
            warn!("discovery responder stopped: {error}");
        }
    });
    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!("Failed to install Ctrl+C handler: {error}");
        std::future::pending::<()>().await;
    }
    info!("Shutting down server...");
}
