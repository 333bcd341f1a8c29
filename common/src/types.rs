//! 共通型定義
//!
//! プローブ結果・アラートメッセージ等のコアデータ型

use serde::{Deserialize, Serialize};
use std::fmt;

/// 正常とみなすHTTPステータス
pub const STATUS_OK: u16 = 200;

/// トランスポート層の失敗時に送るアラート本文
pub const API_DOWN_TEXT: &str = "API is down!";

/// 1回のプローブ結果
///
/// トランスポート層の失敗はすべて`Timeout`か`Connection`に畳み込まれる。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProbeOutcome {
    /// 200 OK
    Success {
        /// HTTPステータス
        status: u16,
    },
    /// 200以外のステータス
    UnexpectedStatus {
        /// HTTPステータス
        status: u16,
    },
    /// リクエストタイムアウト
    Timeout,
    /// 接続エラー（DNS失敗、接続拒否、TLSエラー等）
    Connection {
        /// エラー内容
        reason: String,
    },
}

impl ProbeOutcome {
    /// HTTPステータスから結果を分類
    pub fn from_status(status: u16) -> Self {
        if status == STATUS_OK {
            Self::Success { status }
        } else {
            Self::UnexpectedStatus { status }
        }
    }

    /// 成功かどうか
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// レスポンスを受け取れた場合のステータス
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Success { status } | Self::UnexpectedStatus { status } => Some(*status),
            Self::Timeout | Self::Connection { .. } => None,
        }
    }

    /// ログ出力用の分類名
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::UnexpectedStatus { .. } => "unexpected_status",
            Self::Timeout => "timeout",
            Self::Connection { .. } => "connection_error",
        }
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success { status } | Self::UnexpectedStatus { status } => {
                write!(f, "HTTP {}", status)
            }
            Self::Timeout => write!(f, "timeout"),
            Self::Connection { reason } => write!(f, "connection error: {}", reason),
        }
    }
}

/// チャットに送るアラート本文
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlertMessage(String);

impl AlertMessage {
    /// 任意の本文からアラートを作成
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// 200以外のステータスを通知するアラート
    pub fn unexpected_status(status: u16) -> Self {
        Self(format!("API response status: {}", status))
    }

    /// APIダウンを通知するアラート
    pub fn api_down() -> Self {
        Self(API_DOWN_TEXT.to_string())
    }

    /// 本文
    pub fn text(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AlertMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
