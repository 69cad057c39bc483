use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use hangman_server::{AppState, config::Config, serve};

/// Multi-user hangman over plain HTTP.
#[derive(Parser, Debug)]
#[command(name = "hangman-server", version, about)]
struct Args {
    /// Port to listen on
    port: u16,

    /// Directory holding the pages, images and dictionary
    document_root: PathBuf,

    /// Address to bind
    #[arg(short = 'H', long, default_value = "0.0.0.0")]
    host: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let document_root = args
        .document_root
        .canonicalize()
        .with_context(|| format!("Cannot open document root {}", args.document_root.display()))?;
    std::env::set_current_dir(&document_root)
        .with_context(|| format!("Cannot enter {}", document_root.display()))?;
    info!("Serving files from {}", document_root.display());

    let config = Config::from_env(args.host, args.port, document_root)?;
    let state = AppState::new(config)?;

    let address = state.config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!(
        "Hangman server listening on {}. Press Ctrl+C to stop.",
        listener.local_addr()?
    );

    serve(listener, state, shutdown_signal()).await?;
    info!("Server shutdown complete.");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use signal::unix::{SignalKind, signal as unix_signal};

        match (
            unix_signal(SignalKind::interrupt()),
            unix_signal(SignalKind::terminate()),
        ) {
            (Ok(mut sigint), Ok(mut sigterm)) => {
                tokio::select! {
                    _ = sigint.recv() => info!("Received SIGINT, shutting down gracefully..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down gracefully..."),
                }
                return;
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!("Signal handlers unavailable ({}), falling back to Ctrl+C", e);
            }
        }
    }

    match signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down gracefully..."),
        Err(e) => {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
