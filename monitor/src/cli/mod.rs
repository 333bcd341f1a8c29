//! CLI module for opsbench-monitor
//!
//! Provides the command-line interface for the health monitor.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use opsbench_common::types::ProbeOutcome;

/// opsbench health monitor - probes an HTTP API and alerts a chat on failure
#[derive(Parser, Debug)]
#[command(name = "opsbench-monitor")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    OPSBENCH_CONFIG                          Config file path (TOML)
    OPSBENCH_MONITOR__ENDPOINT_URL           URL to probe
    OPSBENCH_MONITOR__NETWORKS               Comma-separated networks (default: bsc,eth,polygon)
    OPSBENCH_MONITOR__INTERVAL_SECS          Seconds between probes (default: 60)
    OPSBENCH_MONITOR__TELEGRAM__BOT_TOKEN    Telegram bot token (required)
    OPSBENCH_MONITOR__TELEGRAM__CHAT_ID      Telegram chat id (required)
    OPSBENCH_LOG_LEVEL                       Log level (default: info)
    OPSBENCH_LOG_FILE                        Append logs to this file
"#)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true, env = "OPSBENCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute (defaults to `run`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Probe forever, alerting on every failure
    Run,
    /// Probe once, alert if needed, and exit non-zero on failure
    Probe,
}

impl Cli {
    /// Subcommand with the default applied
    pub fn resolved_command(&self) -> Commands {
        self.command.unwrap_or(Commands::Run)
    }
}

/// `probe`サブコマンドの終了ステータス（成功時のみ0）
pub fn probe_exit_status(outcome: &ProbeOutcome) -> u8 {
    if outcome.is_success() {
        0
    } else {
        1
    }
}
