//! opsbench Health Monitor
//!
//! 外部APIを定期的にプローブし、失敗時にチャットへアラートを送る

#![warn(missing_docs)]

/// アラート送信（ポリシーと通知先）
pub mod alert;

/// CLIインターフェース
pub mod cli;

/// ヘルスチェック監視
pub mod health;

pub use alert::{alert_for, Notifier, TelegramNotifier};
pub use health::{HealthMonitor, HttpProber, IterationReport, Prober, Sleeper, TokioSleeper};
