//! プローブ間の待機
//!
//! テストで実時間を消費しないよう待機を差し替え可能にする

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

/// 待機処理
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// `duration`だけ待機
    async fn sleep(&self, duration: Duration);
}

/// tokioタイマーによる待機
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// 待機せず、要求された時間だけを記録する
#[derive(Debug, Default)]
pub struct MockSleeper {
    durations: Mutex<Vec<Duration>>,
}

impl MockSleeper {
    /// 新しいMockSleeperを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 呼び出し回数
    pub fn call_count(&self) -> usize {
        self.durations().len()
    }

    /// 要求された待機時間の一覧
    pub fn durations(&self) -> Vec<Duration> {
        self.durations
            .lock()
            .map(|d| d.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Sleeper for MockSleeper {
    async fn sleep(&self, duration: Duration) {
        if let Ok(mut durations) = self.durations.lock() {
            durations.push(duration);
        }
    }
}
