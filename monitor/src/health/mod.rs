//! ヘルスチェックモニター
//!
//! 外部APIを定期的にGETし、結果に応じてアラートを送信する。
//! 1回のプローブ → 分類 → 通知 → スリープを無限に繰り返す。

pub mod monitor;
pub mod probe;
pub mod sleeper;

pub use monitor::{HealthMonitor, IterationReport};
pub use probe::{HttpProber, Prober};
pub use sleeper::{MockSleeper, Sleeper, TokioSleeper};
