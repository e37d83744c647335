//! streamhub Server Binary
//!
//! Starts a streamhub packet server. With both ports configured it acts as a
//! relay: every packet received from a read-port client is broadcast back out
//! to every connected client.

use std::net::IpAddr;
use std::time::Duration;

use clap::Parser;
use streamhub::{ServerConfig, TcpServer};
use tracing_subscriber::{fmt, EnvFilter};

/// streamhub Server
#[derive(Parser, Debug)]
#[command(name = "streamhub-server")]
#[command(about = "Concurrent TCP packet server with pluggable framing and broadcast fan-out")]
#[command(version)]
struct Args {
    /// Port for clients that receive broadcast packets
    #[arg(short, long)]
    write_port: Option<u16>,

    /// Port for clients that send packets to the server
    #[arg(short, long)]
    read_port: Option<u16>,

    /// Address to bind the listeners to
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: IpAddr,

    /// Stream protocol name (BURST, LENGTH, FIXED)
    #[arg(short, long, default_value = "BURST")]
    protocol: String,

    /// Stream protocol arguments (e.g. prefix size for LENGTH)
    #[arg(long)]
    protocol_arg: Vec<String>,

    /// Per-attempt client read timeout in milliseconds
    #[arg(long)]
    read_timeout_ms: Option<u64>,

    /// Client write timeout in milliseconds
    #[arg(long, default_value = "10000")]
    write_timeout_ms: u64,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,streamhub=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    if args.write_port.is_none() && args.read_port.is_none() {
        tracing::error!("At least one of --write-port / --read-port is required");
        std::process::exit(2);
    }

    tracing::info!("streamhub Server v{}", streamhub::VERSION);
    tracing::info!(
        "Write port: {:?}, read port: {:?}, protocol: {}",
        args.write_port,
        args.read_port,
        args.protocol
    );

    let config = ServerConfig::builder()
        .write_port(args.write_port)
        .read_port(args.read_port)
        .bind_addr(args.bind)
        .protocol(args.protocol.clone())
        .protocol_args(args.protocol_arg.clone())
        .read_timeout(args.read_timeout_ms.map(Duration::from_millis))
        .write_timeout(Duration::from_millis(args.write_timeout_ms))
        .build();

    let server = match TcpServer::new(config) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = server.connect() {
        tracing::error!("Failed to start server: {e}");
        std::process::exit(1);
    }

    if args.read_port.is_some() {
        // Relay loop: read() blocks until a packet arrives; write() is a
        // no-op when no write port is configured.
        while let Some(packet) = server.read() {
            server.write(packet);
        }
    } else {
        // Broadcast-only server: nothing to relay, park until killed.
        loop {
            std::thread::sleep(Duration::from_secs(60));
        }
    }

    server.disconnect();
    tracing::info!("Server stopped");
}
