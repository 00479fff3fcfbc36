//! failoverd - failover IP automation for an active/passive load balancer pair
//!
//! Usage:
//!     failoverd --config <path> [--verbose]
//!
//! See --help for more options.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use failoverd::bootstrap::bootstrap;
use failoverd::config::{load_config, Config};
use failoverd::failover::{FailoverController, FailoverPolicy};
use failoverd::health::HttpProber;
use failoverd::metrics::{MetricsCollector, MetricsServer};
use failoverd::provider::RobotClient;
use failoverd::util::{effective_level, init_logging, ShutdownSignal};

/// Check the primary load balancer and move failover IPs to the backup when it goes down.
#[derive(Parser, Debug)]
#[command(name = "failoverd")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,

    /// Increase output verbosity (debug level)
    #[arg(short, long)]
    verbose: bool,

    /// Override log level (trace, debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Validate configuration and exit
    #[arg(long)]
    validate: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli.config).with_context(|| {
        format!(
            "failed to load configuration from '{}'",
            cli.config.display()
        )
    })?;

    let log_level = effective_level(
        cli.verbose,
        cli.log_level.as_deref(),
        &config.global.log_level,
    );
    init_logging(log_level, &config.global.log_format);

    if cli.validate {
        info!("Configuration is valid");
        println!("Configuration is valid.");
        println!("  Primary: {}", config.failover.primary);
        println!("  Backup: {}", config.failover.backup);
        println!("  Health check: {}", config.health_check.url);
        println!("  Provider API: {}", config.provider.api_url);
        return Ok(());
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        config_path = %cli.config.display(),
        "failoverd starting"
    );

    run(config)
}

/// Build the runtime and run the daemon until shutdown.
fn run(config: Config) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    runtime.block_on(async { run_async(config).await })
}

async fn run_async(config: Config) -> Result<()> {
    let robot = RobotClient::new(&config.provider).context("failed to build provider client")?;
    let prober =
        HttpProber::from_config(&config.health_check).context("failed to build health check client")?;

    let cluster = bootstrap(&config, &robot)
        .await
        .context("startup failed")?;

    let shutdown = ShutdownSignal::new();
    let metrics = MetricsCollector::new();

    let metrics_handle = if config.global.metrics.enabled {
        let server = MetricsServer::new(
            config.global.metrics.address,
            config.global.metrics.path.clone(),
            metrics.clone(),
        );
        Some(tokio::spawn(server.run(shutdown.subscribe())))
    } else {
        None
    };

    let mut controller = FailoverController::new(
        cluster.primary,
        cluster.backup,
        cluster.managed_ips,
        prober,
        robot,
        FailoverPolicy::default(),
        metrics,
    );

    let controller_shutdown = shutdown.subscribe();
    tokio::spawn(shutdown.clone().trigger_on_ctrl_c());

    controller.run(controller_shutdown).await;

    if let Some(handle) = metrics_handle {
        let _ = handle.await;
    }

    info!("failoverd shut down complete");
    Ok(())
}
