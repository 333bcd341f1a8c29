//! アラート送信
//!
//! プローブ結果からアラートを決定するポリシーと、送信先の抽象化

pub mod telegram;

pub use telegram::TelegramNotifier;

use async_trait::async_trait;
use opsbench_common::error::MonitorResult;
use opsbench_common::types::{AlertMessage, ProbeOutcome};

/// アラートの送信先
#[async_trait]
pub trait Notifier: Send + Sync {
    /// アラートを1件送信
    async fn notify(&self, message: &AlertMessage) -> MonitorResult<()>;
}

/// プローブ結果に対するアラートを決定
///
/// すべての失敗分類をここで明示的に扱う。重複抑止は行わないため、
/// 障害が続く間は毎回アラートが返る。
pub fn alert_for(outcome: &ProbeOutcome) -> Option<AlertMessage> {
    match outcome {
        ProbeOutcome::Success { .. } => None,
        ProbeOutcome::UnexpectedStatus { status } => Some(AlertMessage::unexpected_status(*status)),
        ProbeOutcome::Timeout | ProbeOutcome::Connection { .. } => Some(AlertMessage::api_down()),
    }
}
