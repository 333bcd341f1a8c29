//! opsbench 共通ライブラリ
//!
//! ヘルスモニターとフィクスチャで共有する型・エラー・設定・ロギング

#![warn(missing_docs)]

/// 設定管理（設定ファイル・環境変数）
pub mod config;

/// エラー型定義
pub mod error;

/// ロギング初期化ユーティリティ
pub mod logging;

/// 共通型定義
pub mod types;
