use clap::Parser;

use roster_server::ServerConfig;
use roster_store::UserStore;

/// In-memory user record HTTP service.
#[derive(Debug, Parser)]
#[command(name = "roster", version, about)]
struct Cli {
    /// Port to listen on.
    #[arg(long, default_value_t = 5000, env = "ROSTER_PORT")]
    port: u16,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting roster server");

    // The store lives for the lifetime of the process and starts empty.
    let store = UserStore::new();

    let config = ServerConfig { port: cli.port };
    let handle = roster_server::start(config, store)
        .await
        .expect("Failed to start server");

    tracing::info!(port = handle.port, "roster server ready");

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for ctrl+c");

    tracing::info!("Shutting down");
}
