//! A terminal blackjack client.
//!
//! The client finds a server over UDP discovery (or takes one from the
//! command line), then walks the player through the lobby and every round.

use anyhow::{Context, Result};
use pico_args::Arguments;
use private_blackjack::{Client, net::discovery};
use std::{net::SocketAddr, time::Duration};

use pb_client::driver::{Driver, StdinLines};

const HELP: &str = "\
Connect to a private blackjack server

USAGE:
  pb_client [OPTIONS]

OPTIONS:
  --server IP:PORT        Server address, skips discovery
  --discovery-port PORT   UDP port to broadcast discovery probes on  [default: 2927]
  --json                  Print snapshots and results as JSON lines

FLAGS:
  -h, --help              Print help information
";

const DISCOVERY_TIMEOUT: Duration = Duration::from_secs(3);

struct Args {
    server: Option<SocketAddr>,
    discovery_port: u16,
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut pargs = Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        server: pargs.opt_value_from_str("--server")?,
        discovery_port: pargs
            .opt_value_from_str("--discovery-port")?
            .unwrap_or(discovery::DEFAULT_DISCOVERY_PORT),
        json: pargs.contains("--json"),
    };

    run(args).await
}

async fn run(args: Args) -> Result<()> {
    let addr = match args.server {
        Some(addr) => addr,
        None => {
            eprintln!("Looking for a server on udp/{}...", args.discovery_port);
            discovery::discover(args.discovery_port, DISCOVERY_TIMEOUT)
                .await
                .context("No server answered; pass --server IP:PORT to skip discovery")?
        }
    };

    eprintln!("Connecting to {addr}");
    let client = Client::connect(addr).await?;

    let results = Driver::new(client, StdinLines::new(), std::io::stdout())
        .json(args.json)
        .run()
        .await?;

    eprintln!("Played {} round(s)", results.len());
    Ok(())
}
