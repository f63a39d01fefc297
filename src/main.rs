//! forward-proxy binary entry point.
//!
//! Wires CLI flags over an optional TOML config file, initializes
//! logging/metrics, binds the listener, and runs the accept loop until a
//! shutdown signal arrives.

use std::path::PathBuf;

use clap::Parser;

use forward_proxy::config::loader::{check_config, load_config};
use forward_proxy::config::ProxyConfig;
use forward_proxy::lifecycle::{signals, Shutdown};
use forward_proxy::net::listener::Listener;
use forward_proxy::observability::{logging, metrics};
use forward_proxy::tunnel::ProxyServer;

#[derive(Parser, Debug)]
#[command(name = "forward-proxy")]
#[command(about = "HTTP CONNECT proxy with TLS record splitting", version)]
struct Args {
    /// Path to a TOML configuration file. Flags override file values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to listen on.
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on.
    #[arg(long)]
    port: Option<u16>,

    /// Rewrite early client packets into fragmented TLS records.
    #[arg(short = 'r', long)]
    resplit: bool,

    /// Number of initial client packets eligible for splitting.
    #[arg(long)]
    resplit_count: Option<u64>,

    /// Verbose tracing of reads and record headers.
    #[arg(short = 'd', long)]
    debug: bool,

    /// Only log warnings and errors.
    #[arg(short = 's', long)]
    silent: bool,

    /// Bytes per read on either side of a tunnel.
    #[arg(long)]
    buffer_size: Option<usize>,

    /// Minimum payload length of a synthetic record.
    #[arg(long)]
    min_split: Option<usize>,

    /// Maximum payload length of a synthetic record.
    #[arg(long)]
    max_split: Option<usize>,
}

impl Args {
    fn apply(&self, config: &mut ProxyConfig) {
        if let Some(host) = &self.host {
            config.listener.host = host.clone();
        }
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if self.resplit {
            config.relay.resplit = true;
        }
        if let Some(count) = self.resplit_count {
            config.relay.resplit_count = count;
        }
        if self.debug {
            config.observability.debug = true;
        }
        if self.silent {
            config.observability.silent = true;
        }
        if let Some(size) = self.buffer_size {
            config.relay.buffer_size = size;
        }
        if let Some(min) = self.min_split {
            config.relay.min_split = min;
        }
        if let Some(max) = self.max_split {
            config.relay.max_split = max;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };
    args.apply(&mut config);
    check_config(&config)?;

    logging::init(&config.observability);

    tracing::info!("forward-proxy v0.1.0 starting");
    tracing::info!(
        host = %config.listener.host,
        port = config.listener.port,
        resplit = config.relay.resplit,
        resplit_count = config.relay.resplit_count,
        min_split = config.relay.min_split,
        max_split = config.relay.max_split,
        buffer_size = config.relay.buffer_size,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => {
                tracing::error!(
                    metrics_address = %config.observability.metrics_address,
                    "Failed to parse metrics address"
                );
            }
        }
    }

    let listener = Listener::bind(&config.listener).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::watch(&shutdown).await;
    });

    let server = ProxyServer::new(config);
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
