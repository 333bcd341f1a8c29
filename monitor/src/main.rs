//! opsbench Health Monitor Entry Point

use std::process::ExitCode;

use clap::Parser;
use opsbench_common::config::MonitorConfig;
use opsbench_common::logging;
use opsbench_monitor::cli::{probe_exit_status, Cli, Commands};
use opsbench_monitor::{HealthMonitor, HttpProber, TelegramNotifier};
use tracing::info;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _log_guard = match logging::init() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: failed to initialize logging: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // 逐次実行のみのためcurrent-threadランタイムで十分
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to build Tokio runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error + Send + Sync>> {
    let config = MonitorConfig::load(cli.config.as_deref())?;
    let prober = HttpProber::new(&config)?;
    let notifier = TelegramNotifier::new(&config.telegram)?;

    info!(
        endpoint = %config.endpoint_url,
        networks = %config.networks_query(),
        chat_id = %notifier.chat_id(),
        "Monitor configured"
    );

    let monitor = HealthMonitor::new(prober, notifier, config.interval());

    match cli.resolved_command() {
        Commands::Run => {
            monitor.run().await;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Probe => {
            let report = monitor.run_iteration().await;
            Ok(ExitCode::from(probe_exit_status(&report.outcome)))
        }
    }
}
