//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::PeerEntry;

/// reportpoller - periodic resource report poller
#[derive(Parser)]
#[command(
    name = "reportpoller",
    about = "Pull resource reports from cluster peers with bounded concurrency",
    version,
    after_help = "Logs are written to: ~/.local/share/reportpoller/logs/reportpoller.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Log to stderr instead of the log file
    #[arg(long, global = true)]
    pub stderr: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Run the poller in the foreground until interrupted
    Run {
        /// Extra peer to poll (repeatable)
        #[arg(short, long = "peer", value_name = "ID=HOST:PORT")]
        peers: Vec<PeerEntry>,

        /// Override poller.max-concurrent-pulls
        #[arg(long)]
        max_concurrent_pulls: Option<usize>,

        /// Override poller.poll-period-ms
        #[arg(long)]
        poll_period_ms: Option<u64>,

        /// Stop after this many seconds instead of waiting for Ctrl-C
        #[arg(short, long)]
        duration_secs: Option<u64>,

        /// Output format for the final summary
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Pull a single report from one peer and print it
    Poll {
        /// Peer address (host:port)
        address: String,

        /// Output format
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,
    },

    /// Print the effective configuration
    Config,
}

/// Output format for summaries and reports
#[derive(Clone, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Location of the log file written by the binary
pub fn get_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("reportpoller")
        .join("logs")
        .join("reportpoller.log")
}
