//! Telegram Bot API通知
//!
//! `POST {api_base}/bot{token}/sendMessage` でチャットへ平文を送る

use std::time::Duration;

use async_trait::async_trait;
use opsbench_common::config::TelegramConfig;
use opsbench_common::error::{MonitorError, MonitorResult};
use opsbench_common::types::AlertMessage;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use super::Notifier;

/// 送信タイムアウト（秒）
const SEND_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Telegramボットによる通知
#[derive(Clone)]
pub struct TelegramNotifier {
    client: Client,
    api_base: String,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    /// 設定から通知先を作成
    pub fn new(config: &TelegramConfig) -> MonitorResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(SEND_TIMEOUT_SECS))
            .build()
            .map_err(|e| MonitorError::Http(e.to_string()))?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            bot_token: config.bot_token.clone(),
            chat_id: config.chat_id.clone(),
        })
    }

    /// 送信先チャットID
    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.bot_token)
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, message: &AlertMessage) -> MonitorResult<()> {
        let body = SendMessageRequest {
            chat_id: &self.chat_id,
            text: message.text(),
        };

        // トークンがURLに含まれるため、reqwestのエラー文言はURLを除いて扱う
        let response = self
            .client
            .post(self.send_message_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| MonitorError::Notify(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MonitorError::Notify(format!("HTTP {}", status.as_u16())));
        }

        debug!(chat_id = %self.chat_id, "Alert delivered");
        Ok(())
    }
}
