//! imgstore Server Binary
//!
//! Serves one store file over TCP.

use clap::Parser;
use imgstore::network::Server;
use imgstore::{Config, ImgStore, OpenMode};
use tracing_subscriber::{fmt, EnvFilter};

/// imgstore Server
#[derive(Parser, Debug)]
#[command(name = "imgstore-server")]
#[command(about = "Serve an imgstore file over TCP")]
#[command(version)]
struct Args {
    /// Store file to serve (must already exist)
    store: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:8000")]
    listen: String,

    /// Number of worker threads
    #[arg(short, long, default_value = "4")]
    workers: usize,

    /// Connection read timeout in milliseconds (0 disables)
    #[arg(long, default_value = "5000")]
    read_timeout_ms: u64,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,imgstore=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("imgstore server v{}", imgstore::VERSION);
    tracing::info!("Store file: {}", args.store);

    let config = Config::builder()
        .listen_addr(&args.listen)
        .worker_threads(args.workers)
        .read_timeout_ms(args.read_timeout_ms)
        .build();

    let store = match ImgStore::open(&args.store, OpenMode::ReadWrite) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to open store {}: {}", args.store, e);
            std::process::exit(i32::from(e.code()));
        }
    };

    tracing::info!(
        "Store opened: {}/{} files",
        store.num_files(),
        store.header().max_files
    );

    let server = match Server::bind(config, store) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", args.listen, e);
            std::process::exit(i32::from(e.code()));
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(i32::from(e.code()));
    }
}
