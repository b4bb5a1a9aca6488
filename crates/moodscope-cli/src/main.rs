//! MoodScope
//!
//! Command-line runner for the mood pipeline.
//!
//! `mood` computes one scope, `run-all` refreshes every known scope once and
//! `watch` repeats `run-all` on an interval until interrupted.

use anyhow::Result;
use clap::{Parser, Subcommand};
use moodscope_insights::{FileTextRepository, GeoDataset, MoodService};
use moodscope_telemetry::MetricsCollector;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{info, warn};

mod config;

use config::MoodscopeConfig;

#[derive(Parser, Debug)]
#[command(name = "moodscope")]
#[command(about = "Aggregated mood insights from recent user text", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "moodscope.yaml")]
    config: String,

    /// Text export to read posts and comments from
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Country boundary dataset
    #[arg(short, long)]
    geo: Option<PathBuf>,

    /// Bearer token for the remote inference service
    #[arg(long, env = "MOODSCOPE_REMOTE_TOKEN", hide_env_values = true)]
    remote_token: Option<String>,

    /// Serve Prometheus metrics on this address
    #[arg(long)]
    metrics_listen: Option<SocketAddr>,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Compute the mood of one country, or the global mood
    Mood {
        /// ISO 3166-1 alpha-2 code; omit for global
        scope: Option<String>,
    },

    /// Refresh every known scope once
    RunAll,

    /// Refresh every known scope on an interval
    Watch {
        /// Seconds between runs
        #[arg(long, default_value_t = 300)]
        interval_secs: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.log_json);

    let config = MoodscopeConfig::load(&cli.config, &cli)?;
    info!(
        data = %config.data_path.display(),
        endpoint = %config.classifier.remote.endpoint,
        "Configuration loaded"
    );

    if let Some(addr) = cli.metrics_listen {
        init_metrics(addr)?;
    }

    let metrics = MetricsCollector::new();
    let service = build_service(&config, metrics.clone())?;

    match cli.command {
        Command::Mood { scope } => {
            let mood = service.get_country_mood(scope.as_deref()).await?;
            println!("{}", serde_json::to_string_pretty(mood.as_ref())?);
        }
        Command::RunAll => {
            let summary = service.run_all_country_moods().await;
            println!("{}", serde_json::to_string_pretty(&summary)?);
            println!("{}", serde_json::to_string_pretty(&metrics.snapshot())?);
        }
        Command::Watch { interval_secs } => {
            watch(&service, Duration::from_secs(interval_secs.max(1))).await;
        }
    }

    Ok(())
}

fn build_service(config: &MoodscopeConfig, metrics: MetricsCollector) -> Result<MoodService> {
    let classifier = config.classifier.build(metrics.clone())?;
    let repository = FileTextRepository::new(config.data_path.clone());
    let geo = config
        .geo_path
        .clone()
        .map(GeoDataset::new)
        .unwrap_or_default();

    let service = MoodService::from_config(
        &config.insights,
        Arc::new(repository),
        Arc::new(classifier),
        geo,
        metrics,
    )?;
    Ok(service)
}

/// Ticker for `watch`; a slow run pushes the next one back instead of bursting
fn watch_ticker(every: Duration) -> Interval {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

/// Run batches until a shutdown signal arrives
async fn watch(service: &MoodService, every: Duration) {
    let mut ticker = watch_ticker(every);
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    info!(interval_secs = every.as_secs(), "Watching for mood changes");
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let summary = service.run_all_country_moods().await;
                if summary.failed > 0 {
                    warn!(failed = summary.failed, "Batch finished with failures");
                }
            }
            _ = &mut shutdown => {
                warn!("Shutdown signal received, stopping");
                break;
            }
        }
    }
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
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

/// Initialize tracing/logging
fn init_tracing(verbose: bool, json: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("moodscope=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("moodscope=info"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Install the Prometheus exporter behind an HTTP listener
fn init_metrics(addr: SocketAddr) -> Result<()> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "moodscope_cache_total",
        "Cache lookups by outcome (hit or miss)"
    );
    metrics::describe_counter!(
        "moodscope_computations_total",
        "Mood computations that reached the cache"
    );
    metrics::describe_counter!(
        "moodscope_classifier_batches_total",
        "Classified batches by tier"
    );
    metrics::describe_counter!(
        "moodscope_degraded_batches_total",
        "Remote batches answered with neutral labels, by reason"
    );
    metrics::describe_counter!(
        "moodscope_batch_scopes_total",
        "Scopes attempted by batch runs, by outcome"
    );

    info!(%addr, "Metrics exporter listening");
    Ok(())
}
