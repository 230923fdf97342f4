use clap::Parser;
use pingboard_common::logging::init_logging;
use pingboard_common::shutdown::shutdown_signal;
use pingboard_common::version::VERSION;
use pingboard_prober::{HttpStatusReporter, IcmpProbe, Prober, ProberConfig};
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(author, version = VERSION, about = "Pings configured hosts and reports their latency", long_about = None)]
struct Args {
    /// Path to an optional TOML configuration file
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    let config = ProberConfig::load(args.config.as_deref())?;
    let _log_guard = init_logging(&config.log_dir, "prober.log");
    info!("Starting prober, version: {}", VERSION);

    if let Some(raw) = &config.rejected_ping_interval {
        warn!(
            value = %raw,
            fallback = ?config.ping_interval,
            "Invalid PING_INTERVAL, using default."
        );
    }

    let reporter = match HttpStatusReporter::new(&config.backend_url) {
        Ok(reporter) => reporter,
        Err(e) => {
            error!(error = %e, "Failed to build HTTP client.");
            return Err(e.into());
        }
    };

    info!(
        targets = ?config.targets,
        interval = ?config.ping_interval,
        backend = %config.backend_url,
        "Starting pinger."
    );

    let prober = Prober::new(
        IcmpProbe::new(),
        reporter,
        config.targets,
        config.ping_interval,
    );

    tokio::select! {
        _ = prober.run() => {},
        _ = shutdown_signal() => {
            info!("Shutdown signal received, stopping prober.");
        }
    }

    Ok(())
}
