//! Fanout - Readiness-Polled Concurrent HTTP Fan-Out Client
//!
//! Opens one TCP connection per target, writes the same HTTP/1.1
//! request to each, then polls the set for readable data, draining and
//! printing whatever arrives until every peer closes its side.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::StreamExt;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fanout::{
    config::ConfigManager,
    mux::{FanoutEngine, MuxEvent},
    protocol, shutdown,
};

/// CLI arguments for Fanout
#[derive(Parser, Debug)]
#[command(name = "fanout")]
#[command(about = "Fanout - Readiness-polled concurrent HTTP fan-out client")]
#[command(version)]
#[command(long_about = "
Fanout - Readiness-Polled Concurrent HTTP Fan-Out Client

Opens one TCP connection per target, writes the same HTTP/1.1 request to
each, then polls the set for readable data, draining and printing
whatever arrives until every peer closes its side.

Configuration priority (highest to lowest):
1. Command-line arguments
2. Configuration file
3. Environment variables
4. Built-in defaults

Environment variables:
  FANOUT_TARGETS          - Comma-separated host:port list
  FANOUT_REQUEST_PATH     - Request path written on every connection
  FANOUT_POLL_INTERVAL    - Poll timeout per readiness check (e.g. 1s, 500ms)
  FANOUT_READ_BUFFER_SIZE - Drain read buffer size in bytes
  FANOUT_LOG_LEVEL        - Log level (trace, debug, info, warn, error)
")]
pub struct CliArgs {
    /// Configuration file path
    #[arg(
        short,
        long,
        default_value = "config.toml",
        help = "Path to configuration file"
    )]
    pub config: PathBuf,

    /// Target endpoint as host:port (repeatable, overrides config file)
    #[arg(
        short = 't',
        long = "target",
        help = "Target endpoint as host:port (repeatable)"
    )]
    pub targets: Vec<String>,

    /// Request path written on every connection
    #[arg(long, help = "Request path written on every connection")]
    pub path: Option<String>,

    /// Poll timeout per readiness check (e.g. 1s, 500ms)
    #[arg(
        long,
        value_parser = humantime::parse_duration,
        help = "Poll timeout per readiness check"
    )]
    pub poll_interval: Option<Duration>,

    /// Drain read buffer size in bytes
    #[arg(long, help = "Drain read buffer size in bytes")]
    pub read_buffer_size: Option<usize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", help = "Log level")]
    pub log_level: String,

    /// Enable verbose logging (sets log level to debug)
    #[arg(short, long, help = "Enable verbose logging")]
    pub verbose: bool,

    /// Validate configuration and exit
    #[arg(long, help = "Validate configuration and exit")]
    pub validate_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();

    // Initialize tracing
    init_tracing(&args)?;

    info!(
        "Starting Fanout v{} - readiness-polled fan-out client",
        env!("CARGO_PKG_VERSION")
    );

    // Load configuration with priority: CLI args > config file > environment > defaults
    let mut config = if args.config.exists() {
        ConfigManager::load_from_file(&args.config)?
    } else {
        info!("Config file not found, checking environment variables");
        ConfigManager::load_from_env()?
    };

    // Apply CLI argument overrides (highest priority)
    config.merge_with_cli_args(
        &args.targets,
        args.path.as_deref(),
        args.poll_interval,
        args.read_buffer_size,
    );

    // Final validation after all overrides
    config
        .validate()
        .context("Final configuration validation failed")?;

    // If validate-config flag is set, just validate and exit
    if args.validate_config {
        info!("Configuration is valid");
        info!("Configuration summary:");
        info!(
            "  Targets: {}",
            config
                .targets
                .iter()
                .map(|t| t.addr())
                .collect::<Vec<_>>()
                .join(", ")
        );
        info!("  Request: {} {}", config.request.method, config.request.path);
        info!("  Poll interval: {:?}", config.poll.interval);
        info!("  Read buffer size: {} bytes", config.poll.read_buffer_size);
        return Ok(());
    }

    info!("Configuration loaded successfully");
    info!(
        "Fanning out to {} targets with poll interval {:?}",
        config.targets.len(),
        config.poll.interval
    );

    let engine = FanoutEngine::from_config(std::sync::Arc::new(config));

    // Setup phase: every target must open before any polling starts.
    let set = engine.connect_all().await?;

    let (events_tx, events_rx) = mpsc::unbounded_channel();

    // Consumer task: drained chunks go straight to stdout, unframed, in
    // the order they were drained.
    let printer = tokio::spawn(async move {
        let mut events = UnboundedReceiverStream::new(events_rx);
        let mut stdout = tokio::io::stdout();

        while let Some(event) = events.next().await {
            match event {
                MuxEvent::Data { chunk, .. } => {
                    if let Err(e) = stdout.write_all(&chunk).await {
                        error!("Failed to write chunk to stdout: {}", e);
                    }
                }
                MuxEvent::Closed { index } => {
                    info!("Connection {} closed", index);
                }
                MuxEvent::Done => {
                    if let Err(e) = stdout.write_all(protocol::COMPLETION_MARKER.as_bytes()).await {
                        error!("Failed to write completion marker: {}", e);
                    }
                }
            }

            if let Err(e) = stdout.flush().await {
                error!("Failed to flush stdout: {}", e);
            }
        }
    });

    tokio::select! {
        result = engine.run(set, events_tx) => {
            let stats = result?;
            info!(
                "Fan-out run complete: {} bytes over {} connections in {} ms",
                stats.total_bytes, stats.connection_count, stats.duration_ms
            );
        }
        _ = shutdown::listen_for_signals() => {
            warn!("Shutdown signal received, aborting run");
        }
    }

    // Let the printer drain any queued events; the channel closes once
    // the run future is done or dropped.
    if let Err(e) = printer.await {
        if !e.is_cancelled() {
            error!("Output task failed: {}", e);
        }
    }

    info!("Shutdown complete");

    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(args: &CliArgs) -> Result<()> {
    let log_level = if args.verbose {
        "debug"
    } else {
        &args.log_level
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(true)
                .with_writer(std::io::stderr),
        )
        .with(env_filter)
        .init();

    Ok(())
}
