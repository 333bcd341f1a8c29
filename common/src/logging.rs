//! ロギング初期化
//!
//! tracing-subscriberを環境変数に従って設定する

use std::io::IsTerminal;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

use crate::config::first_env_var;
use crate::error::CommonError;

/// デフォルトのログレベル
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// ファイル出力ライターのガード
///
/// drop するとバッファがフラッシュされるため、プロセス終了まで保持すること。
#[derive(Debug)]
pub struct LogGuard {
    _guard: Option<WorkerGuard>,
}

/// ロギングを初期化
///
/// - `OPSBENCH_LOG_LEVEL`、未設定なら`RUST_LOG`でフィルタを指定
/// - `OPSBENCH_LOG_FILE` が設定されていればファイルへ追記出力
///
/// 既にグローバルsubscriberが設定済みの場合は何もしない。
pub fn init() -> Result<LogGuard, CommonError> {
    let level = log_level();
    let env_filter = EnvFilter::try_new(&level)
        .map_err(|e| CommonError::Config(format!("invalid log filter '{}': {}", level, e)))?;

    let (writer, guard, ansi) = match log_file_path() {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)?;
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            (BoxMakeWriter::new(non_blocking), Some(guard), false)
        }
        None => (
            BoxMakeWriter::new(std::io::stderr),
            None,
            std::io::stderr().is_terminal(),
        ),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(ansi)
        .with_writer(writer);

    if subscriber.try_init().is_err() {
        return Ok(LogGuard { _guard: None });
    }

    Ok(LogGuard { _guard: guard })
}

fn log_level() -> String {
    first_env_var(&["OPSBENCH_LOG_LEVEL", "RUST_LOG"])
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
}

fn log_file_path() -> Option<PathBuf> {
    std::env::var("OPSBENCH_LOG_FILE").ok().map(PathBuf::from)
}
