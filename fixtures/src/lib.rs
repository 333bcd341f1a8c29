//! opsbench ステーキング/ガバナンス統合テスト用フィクスチャ
//!
//! デプロイ済みコントラクトのバインド・新規デプロイ・設定を、
//! 名前付きでメモ化されるフィクスチャとして宣言し、明示的なDAGで解決する。

#![warn(missing_docs)]

/// フィクスチャが参照するアドレス帳
pub mod address_book;

/// ステーキング/ガバナンスのフィクスチャ定義
pub mod catalog;

/// エラー型定義
pub mod error;

/// フィクスチャ依存グラフとモジュールスコープ
pub mod graph;

/// 台帳（リモートチェーン）の抽象化
pub mod ledger;

/// フォーク済み台帳を模したテスト用ヘルパー
pub mod testing;

pub use address_book::AddressBook;
pub use catalog::{standard_graph, FixtureId};
pub use error::{FixtureError, FixtureResult, LedgerError, LedgerResult};
pub use graph::{Fixture, FixtureContext, FixtureGraph, ModuleScope};
pub use ledger::{Address, ContractHandle, InMemoryLedger, Interface, Ledger, SnapshotId, Token};
