//! エンドポイントプローブ
//!
//! GET 1回の結果を`ProbeOutcome`に分類する

use async_trait::async_trait;
use opsbench_common::config::MonitorConfig;
use opsbench_common::error::{MonitorError, MonitorResult};
use opsbench_common::types::ProbeOutcome;
use reqwest::Client;

/// ヘルスチェック対象への1回の呼び出し
#[async_trait]
pub trait Prober: Send + Sync {
    /// プローブを実行して結果を分類
    ///
    /// トランスポート層のエラーも含め、失敗は戻り値で表現する。
    async fn probe(&self) -> ProbeOutcome;
}

/// HTTP GETによるプローブ
#[derive(Clone)]
pub struct HttpProber {
    client: Client,
    url: String,
    networks: String,
}

impl HttpProber {
    /// 設定からプローブを作成
    pub fn new(config: &MonitorConfig) -> MonitorResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| MonitorError::Http(e.to_string()))?;

        Ok(Self {
            client,
            url: config.endpoint_url.clone(),
            networks: config.networks_query(),
        })
    }

    /// 監視対象のURL
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self) -> ProbeOutcome {
        let result = self
            .client
            .get(&self.url)
            .query(&[("networks", self.networks.as_str())])
            .send()
            .await;

        match result {
            // レスポンスボディは解析しない
            Ok(response) => ProbeOutcome::from_status(response.status().as_u16()),
            Err(e) if e.is_timeout() => ProbeOutcome::Timeout,
            Err(e) => ProbeOutcome::Connection {
                reason: e.to_string(),
            },
        }
    }
}
