use clap::Parser;
use pingboard_common::logging::init_logging;
use pingboard_common::shutdown::shutdown_signal;
use pingboard_common::version::VERSION;
use pingboard_reporter::web::bind_listener;
use pingboard_reporter::{create_axum_router, open_store, ReporterConfig};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version = VERSION, about = "Stores and serves the latest ping status per host", long_about = None)]
struct Args {
    /// Path to an optional TOML configuration file
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    let config = ReporterConfig::load(args.config.as_deref())?;
    let _log_guard = init_logging(&config.log_dir, "reporter.log");
    info!("Starting reporter, version: {}", VERSION);

    // --- Status Store Setup ---
    let store = match open_store(&config).await {
        Ok(store) => store,
        Err(e) => {
            error!(error = %e, "Failed to open status store.");
            return Err(e.into());
        }
    };

    // --- Axum HTTP Server Setup ---
    let http_router = create_axum_router(store);

    let listener = bind_listener(config.port)?;
    info!(address = %listener.local_addr()?, "Reporter listening.");

    axum::serve(listener, http_router)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            info!("Shutdown signal received, stopping HTTP server.");
        })
        .await?;

    info!("Reporter stopped.");
    Ok(())
}
