//! フィクスチャと台帳のエラー型

use opsbench_common::error::CommonError;
use thiserror::Error;

use crate::catalog::FixtureId;
use crate::ledger::Address;

/// 台帳操作のエラー
#[derive(Debug, Error)]
pub enum LedgerError {
    /// アドレスにコードが存在しない
    #[error("No contract code at {0}")]
    NoCode(Address),

    /// 未知のアーティファクト
    #[error("Unknown artifact: {0}")]
    UnknownContract(String),

    /// コントラクトが対応していないメソッド
    #[error("{contract} has no method '{method}'")]
    UnknownMethod {
        /// 呼び出し先
        contract: Address,
        /// メソッド名
        method: String,
    },

    /// トランザクションがリバートした
    #[error("{method} on {contract} reverted: {reason}")]
    Reverted {
        /// 呼び出し先
        contract: Address,
        /// メソッド名
        method: String,
        /// リバート理由
        reason: String,
    },

    /// 引数の数や型が合わない
    #[error("Bad arguments for {method}: {reason}")]
    BadArguments {
        /// メソッド名
        method: String,
        /// 詳細
        reason: String,
    },

    /// 存在しないスナップショット
    #[error("Unknown snapshot: {0}")]
    UnknownSnapshot(u64),
}

/// フィクスチャ解決のエラー
#[derive(Debug, Error)]
pub enum FixtureError {
    /// 台帳操作の失敗
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// グラフに登録されていないフィクスチャ
    #[error("Fixture {0} is not registered")]
    Unregistered(FixtureId),

    /// 依存関係の循環
    #[error("Fixture dependency cycle: {}", format_path(.0))]
    Cycle(Vec<FixtureId>),

    /// ビルド時に依存フィクスチャが未解決
    #[error("Fixture {fixture} requires {dependency}, which has not been resolved")]
    MissingDependency {
        /// 要求したフィクスチャ
        fixture: FixtureId,
        /// 未解決の依存
        dependency: FixtureId,
    },

    /// ビルド後の検証に失敗
    #[error("Fixture {fixture} invariant violated: {detail}")]
    Invariant {
        /// 対象フィクスチャ
        fixture: FixtureId,
        /// 詳細
        detail: String,
    },

    /// 先行する失敗によりスコープが中断済み
    #[error("Module scope aborted after {failed} failed")]
    ScopeAborted {
        /// 最初に失敗したフィクスチャ
        failed: FixtureId,
    },

    /// アドレス帳の不備
    #[error("Address book error: {0}")]
    AddressBook(String),

    /// 設定ファイルの読み込み失敗
    #[error(transparent)]
    Common(#[from] CommonError),
}

fn format_path(path: &[FixtureId]) -> String {
    path.iter()
        .map(|id| id.as_str())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// 台帳操作のResult型
pub type LedgerResult<T> = Result<T, LedgerError>;

/// フィクスチャ解決のResult型
pub type FixtureResult<T> = Result<T, FixtureError>;
