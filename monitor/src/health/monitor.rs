//! ヘルスモニター本体
//!
//! プローブ → 分類 → 通知 → スリープを逐次実行する。
//! ループ内のエラーはすべてログとアラートに変換され、ループ自体は終了しない。

use std::time::Duration;

use chrono::{DateTime, Utc};
use opsbench_common::types::{AlertMessage, ProbeOutcome};
use tracing::{debug, error, info, warn};

use super::probe::Prober;
use super::sleeper::{Sleeper, TokioSleeper};
use crate::alert::{alert_for, Notifier};

/// 1回のイテレーションの結果
#[derive(Debug, Clone, PartialEq)]
pub struct IterationReport {
    /// プローブ実行時刻
    pub checked_at: DateTime<Utc>,
    /// プローブ結果
    pub outcome: ProbeOutcome,
    /// 送信しようとしたアラート
    pub alert: Option<AlertMessage>,
    /// アラートの送信に成功したか
    pub delivered: bool,
}

/// ヘルスモニター
pub struct HealthMonitor<P, N, S = TokioSleeper> {
    prober: P,
    notifier: N,
    sleeper: S,
    interval: Duration,
}

impl<P, N> HealthMonitor<P, N, TokioSleeper>
where
    P: Prober,
    N: Notifier,
{
    /// 新しいモニターを作成
    pub fn new(prober: P, notifier: N, interval: Duration) -> Self {
        Self {
            prober,
            notifier,
            sleeper: TokioSleeper,
            interval,
        }
    }
}

impl<P, N, S> HealthMonitor<P, N, S>
where
    P: Prober,
    N: Notifier,
    S: Sleeper,
{
    /// 待機処理を差し替える
    pub fn with_sleeper<T: Sleeper>(self, sleeper: T) -> HealthMonitor<P, N, T> {
        HealthMonitor {
            prober: self.prober,
            notifier: self.notifier,
            sleeper,
            interval: self.interval,
        }
    }

    /// プローブ間隔
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// プローブへの参照
    pub fn prober(&self) -> &P {
        &self.prober
    }

    /// 通知先への参照
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// 待機処理への参照
    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }

    /// プロセス終了まで監視を続ける
    pub async fn run(&self) {
        info!(
            interval_secs = self.interval.as_secs(),
            "Health monitor started"
        );

        loop {
            self.tick().await;
        }
    }

    /// `iterations`回だけ監視する（各回の後に待機する）
    pub async fn run_for(&self, iterations: usize) -> Vec<IterationReport> {
        let mut reports = Vec::with_capacity(iterations);
        for _ in 0..iterations {
            reports.push(self.tick().await);
        }
        reports
    }

    async fn tick(&self) -> IterationReport {
        let report = self.run_iteration().await;
        debug!(interval_secs = self.interval.as_secs(), "Sleep 1 min");
        self.sleeper.sleep(self.interval).await;
        report
    }

    /// 1回のプローブと通知（待機なし）
    pub async fn run_iteration(&self) -> IterationReport {
        let checked_at = Utc::now();
        let outcome = self.prober.probe().await;

        match &outcome {
            ProbeOutcome::Success { status } => {
                info!(status = *status, "Probe succeeded");
            }
            ProbeOutcome::UnexpectedStatus { status } => {
                warn!(status = *status, "Probe returned unexpected status");
            }
            ProbeOutcome::Timeout | ProbeOutcome::Connection { .. } => {
                warn!(outcome = %outcome, "Probe failed");
            }
        }

        let alert = alert_for(&outcome);
        let delivered = match &alert {
            Some(message) => match self.notifier.notify(message).await {
                Ok(()) => true,
                Err(e) => {
                    error!(error = %e, alert = %message, "Failed to deliver alert");
                    false
                }
            },
            None => false,
        };

        IterationReport {
            checked_at,
            outcome,
            alert,
            delivered,
        }
    }
}
