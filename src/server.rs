use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

use dishbrain::{api, logging, source::source_from_config, DishbrainConfig, ExpertRepository, Lookups};

#[derive(Parser)]
#[command(name = "dishbrain-server")]
#[command(about = "HTTP API for the Dishbrain expert directory")]
#[command(version)]
struct Args {
    #[arg(short, long, env = "DISHBRAIN_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on, overriding `server.bind`
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = DishbrainConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    let _guard = logging::init_logging(&config.logging)?;

    info!("Initializing state...");
    let source = source_from_config(&config.source).context("Failed to create expert source")?;
    let repository = Arc::new(ExpertRepository::new(source));
    let lookups = Lookups::from_config(&config.lookup).context("Failed to create lookup clients")?;

    // Load eagerly so the first request does not pay for it
    let metadata = repository.metadata().await;
    if metadata.degraded {
        warn!(source = %metadata.source, "Serving an empty roster");
    }

    let app = api::router(api::AppState::new(repository, lookups));

    let listener = TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;
    info!(address = %config.server.bind, experts = metadata.total_experts, "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!(error = %e, "Failed to install terminate handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
