//! 設定管理
//!
//! MonitorConfig等の設定構造体と、環境変数ヘルパー
//!
//! 設定は「デフォルト値 → 設定ファイル（TOML）→ 環境変数」の順に重ねて読み込む。
//! ボットトークン等の秘密情報はソースに埋め込まず、必ず外部から注入する。

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::CommonError;

/// モニター設定の環境変数プレフィックス
pub const MONITOR_ENV_PREFIX: &str = "OPSBENCH_MONITOR";

/// 最初に設定されている環境変数の値を返す
///
/// `names`を先頭から順に調べ、どれも未設定なら`None`。
pub fn first_env_var(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| std::env::var(name).ok())
}

/// ヘルスモニター設定
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonitorConfig {
    /// 監視対象のURL
    #[serde(default = "default_endpoint_url")]
    pub endpoint_url: String,

    /// `networks`クエリで報告対象とするネットワーク
    #[serde(default = "default_networks")]
    pub networks: Vec<String>,

    /// プローブ間隔（秒）(デフォルト: 60)
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// HTTPリクエストのタイムアウト（秒）(デフォルト: 10)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// アラート送信先
    #[serde(default)]
    pub telegram: TelegramConfig,
}

/// Telegramボット設定
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TelegramConfig {
    /// Bot APIのベースURL (デフォルト: "https://api.telegram.org")
    #[serde(default = "default_telegram_api_base")]
    pub api_base: String,

    /// ボットトークン（必須）
    #[serde(default)]
    pub bot_token: String,

    /// 送信先チャットID（必須）
    #[serde(default)]
    pub chat_id: String,
}

fn default_endpoint_url() -> String {
    "https://api.bzx.network/v1/farming-pools-info".to_string()
}

fn default_networks() -> Vec<String> {
    vec!["bsc".to_string(), "eth".to_string(), "polygon".to_string()]
}

fn default_interval() -> u64 {
    60
}

fn default_request_timeout() -> u64 {
    10
}

fn default_telegram_api_base() -> String {
    "https://api.telegram.org".to_string()
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            endpoint_url: default_endpoint_url(),
            networks: default_networks(),
            interval_secs: default_interval(),
            request_timeout_secs: default_request_timeout(),
            telegram: TelegramConfig {
                api_base: default_telegram_api_base(),
                ..TelegramConfig::default()
            },
        }
    }
}

impl MonitorConfig {
    /// 設定ファイル（任意）と環境変数から読み込む
    ///
    /// 環境変数は `OPSBENCH_MONITOR__TELEGRAM__BOT_TOKEN` のように
    /// `__` 区切りでネストを表す。`networks` はカンマ区切り。
    pub fn load(path: Option<&Path>) -> Result<Self, CommonError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(MONITOR_ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("networks")
                .try_parsing(true),
        );

        let config: MonitorConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 値の妥当性を検証
    pub fn validate(&self) -> Result<(), CommonError> {
        if self.endpoint_url.trim().is_empty() {
            return Err(CommonError::Validation(
                "endpoint_url must not be empty".to_string(),
            ));
        }
        if self.interval_secs == 0 {
            return Err(CommonError::Validation(
                "interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.telegram.bot_token.trim().is_empty() {
            return Err(CommonError::Config(
                "telegram.bot_token is not set".to_string(),
            ));
        }
        if self.telegram.chat_id.trim().is_empty() {
            return Err(CommonError::Config("telegram.chat_id is not set".to_string()));
        }
        Ok(())
    }

    /// プローブ間隔
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// HTTPタイムアウト
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// `networks`クエリの値（カンマ区切り）
    pub fn networks_query(&self) -> String {
        self.networks.join(",")
    }
}
