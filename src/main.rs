//! reportpoller - periodic resource report poller
//!
//! CLI entry point for running the poller against a set of peers.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{CommandFactory, Parser};
use eyre::{Context, Result};
use tracing::info;

use reportpoller::cli::{Cli, Command, OutputFormat, get_log_path};
use reportpoller::config::{Config, PeerEntry};
use reportpoller::domain::PeerAddress;
use reportpoller::membership::StaticMembership;
use reportpoller::poller::{PollerStats, ReportPoller};
use reportpoller::rpc::{HttpClientPool, ReportClient, ReportClientPool};
use reportpoller::sink::ClusterResourceView;

fn setup_logging(verbose: bool, to_stderr: bool) -> Result<()> {
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

    if to_stderr {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .init();
    } else {
        let log_path = get_log_path();
        if let Some(log_dir) = log_path.parent() {
            fs::create_dir_all(log_dir).context("Failed to create log directory")?;
        }

        // Write to log file, not stdout/stderr
        let log_file = fs::File::create(&log_path).context("Failed to create log file")?;
        tracing_subscriber::fmt()
            .with_writer(log_file)
            .with_ansi(false)
            .with_env_filter(filter)
            .init();
    }

    info!("Logging initialized (verbose: {})", verbose);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.stderr).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    info!(
        "reportpoller loaded config: max-concurrent-pulls={}, poll-period-ms={}, peers={}",
        config.poller.max_concurrent_pulls,
        config.poller.poll_period_ms,
        config.peers.len()
    );

    match cli.command {
        Some(Command::Run {
            peers,
            max_concurrent_pulls,
            poll_period_ms,
            duration_secs,
            format,
        }) => {
            let mut config = config;
            if let Some(max) = max_concurrent_pulls {
                config.poller.max_concurrent_pulls = max;
            }
            if let Some(period) = poll_period_ms {
                config.poller.poll_period_ms = period;
            }
            config.peers.extend(peers);
            cmd_run(config, duration_secs.map(Duration::from_secs), format).await
        }
        Some(Command::Poll { address, format }) => cmd_poll(&config, &address, format).await,
        Some(Command::Config) => cmd_config(&config),
        None => {
            Cli::command().print_help()?;
            println!();
            Ok(())
        }
    }
}

/// Run the poller until Ctrl-C or the optional duration elapses
async fn cmd_run(config: Config, duration: Option<Duration>, format: OutputFormat) -> Result<()> {
    config.validate().context("Invalid configuration")?;

    if config.peers.is_empty() {
        println!("No peers configured. Add some with --peer ID=HOST:PORT or the peers: config section.");
        return Ok(());
    }

    let pool = Arc::new(HttpClientPool::from_config(&config.transport).context("Failed to build HTTP client")?);
    let view = ClusterResourceView::new();
    let poller = ReportPoller::new(config.poller.clone(), pool.clone(), Arc::new(view.clone()))?;

    poller.start().await?;
    let membership = StaticMembership::new(config.peers.clone());
    if let Err(e) = membership.seed(&poller).await {
        poller.stop().await;
        return Err(e).context("Failed to register peers");
    }

    println!(
        "Polling {} peers every {}ms (max {} in flight). Press Ctrl+C to stop.",
        membership.len(),
        config.poller.poll_period_ms,
        config.poller.max_concurrent_pulls
    );

    let deadline = async {
        match duration {
            Some(d) => tokio::time::sleep(d).await,
            None => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.context("Failed to listen for Ctrl-C")?;
            info!("Interrupted, stopping poller");
        }
        _ = deadline => {
            info!("Run duration elapsed, stopping poller");
        }
    }

    poller.stop().await;
    let stats = poller.stats().await;
    info!(?stats, connected = pool.connected(), "Poller stopped");

    print_summary(&stats, &view, &config.peers, format)
}

fn print_summary(stats: &PollerStats, view: &ClusterResourceView, peers: &[PeerEntry], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let summary = serde_json::json!({
                "stats": stats,
                "reports": view.snapshot(),
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        OutputFormat::Text => {
            println!();
            println!("Poller Statistics");
            println!("=================");
            println!("  Registered:       {}", stats.registered);
            println!("  Dispatched:       {}", stats.total_dispatched);
            println!("  Succeeded:        {}", stats.total_succeeded);
            println!("  Failed:           {}", stats.total_failed);
            println!("  Stale discarded:  {}", stats.total_stale_discarded);
            println!("  Peak in flight:   {}", stats.peak_in_flight);
            println!();
            println!("Latest Reports");
            println!("==============");
            for peer in peers {
                match view.get(&peer.id.as_str().into()) {
                    Some(report) => {
                        let resources: Vec<String> = report
                            .resources_available
                            .iter()
                            .map(|(name, available)| {
                                let total = report.resources_total.get(name).copied().unwrap_or(0.0);
                                format!("{}={}/{}", name, available, total)
                            })
                            .collect();
                        println!(
                            "  {:<20} {} [{}]",
                            peer.id,
                            report.collected_at.format("%H:%M:%S"),
                            resources.join(", ")
                        );
                    }
                    None => println!("  {:<20} (no report)", peer.id),
                }
            }
        }
    }
    Ok(())
}

/// Pull a single report from one peer
async fn cmd_poll(config: &Config, address: &str, format: OutputFormat) -> Result<()> {
    let address: PeerAddress = address.parse().map_err(|e: String| eyre::eyre!(e))?;
    let pool = HttpClientPool::from_config(&config.transport).context("Failed to build HTTP client")?;

    let client = pool.get_or_connect(&address)?;
    let report = client
        .request_report()
        .await
        .context(format!("Failed to pull report from {}", address))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => {
            println!("Node:      {}", report.node_id);
            println!("Collected: {}", report.collected_at.to_rfc3339());
            for (name, total) in &report.resources_total {
                let available = report.resources_available.get(name).copied().unwrap_or(0.0);
                println!("  {:<12} {}/{} available", name, available, total);
            }
            for (name, load) in &report.resource_load {
                println!("  {:<12} load {}", name, load);
            }
        }
    }
    Ok(())
}

/// Print the effective configuration as YAML
fn cmd_config(config: &Config) -> Result<()> {
    let yaml = serde_yaml::to_string(config).context("Failed to serialize config")?;
    print!("{}", yaml);

    let log_path: PathBuf = get_log_path();
    println!("# log file: {}", log_path.display());
    Ok(())
}
