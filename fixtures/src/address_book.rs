//! アドレス帳
//!
//! バインド対象のアドレスやガバナンスの定数をTOMLから読み込む。
//! ソースにアドレスを直書きしない。

use std::collections::BTreeMap;
use std::path::Path;

use opsbench_common::error::CommonError;
use serde::Deserialize;

use crate::error::{FixtureError, FixtureResult};
use crate::ledger::Address;

fn default_sushi_pool_id() -> u64 {
    335
}

fn default_sushi_alloc_point() -> u64 {
    1000
}

fn default_proposal_threshold() -> u64 {
    500_000_000_000_000_000
}

fn default_quorum_votes() -> u64 {
    3_000_000_000_000_000_000
}

fn default_timelock_eta_buffer_secs() -> u64 {
    100
}

/// フィクスチャが参照するアドレスと定数
#[derive(Debug, Clone, Deserialize)]
pub struct AddressBook {
    /// フィクスチャ名 → アドレス
    #[serde(default)]
    pub contracts: BTreeMap<String, Address>,
    /// ガーディアンのマルチシグ
    pub guardian_multisig: Address,
    /// SushiSwap MasterChef上のプールID
    #[serde(default = "default_sushi_pool_id")]
    pub sushi_pool_id: u64,
    /// プールの配分ポイント
    #[serde(default = "default_sushi_alloc_point")]
    pub sushi_alloc_point: u64,
    /// 提案に必要な票数（wei）
    #[serde(default = "default_proposal_threshold")]
    pub proposal_threshold: u64,
    /// 定足数（wei）
    #[serde(default = "default_quorum_votes")]
    pub quorum_votes: u64,
    /// Timelockのetaに足す余裕（秒）
    #[serde(default = "default_timelock_eta_buffer_secs")]
    pub timelock_eta_buffer_secs: u64,
}

impl AddressBook {
    /// 空のアドレス帳を作成
    pub fn new(guardian_multisig: Address) -> Self {
        Self {
            contracts: BTreeMap::new(),
            guardian_multisig,
            sushi_pool_id: default_sushi_pool_id(),
            sushi_alloc_point: default_sushi_alloc_point(),
            proposal_threshold: default_proposal_threshold(),
            quorum_votes: default_quorum_votes(),
            timelock_eta_buffer_secs: default_timelock_eta_buffer_secs(),
        }
    }

    /// コントラクトを追加
    pub fn with_contract(mut self, name: impl Into<String>, address: Address) -> Self {
        self.contracts.insert(name.into(), address);
        self
    }

    /// TOML文字列から読み込む
    pub fn from_toml_str(source: &str) -> FixtureResult<Self> {
        toml::from_str(source).map_err(|e| FixtureError::AddressBook(e.to_string()))
    }

    /// TOMLファイルから読み込む
    pub fn from_file(path: &Path) -> FixtureResult<Self> {
        let source = std::fs::read_to_string(path).map_err(CommonError::from)?;
        Self::from_toml_str(&source)
    }

    /// 名前に対応するアドレス
    pub fn address(&self, name: &str) -> FixtureResult<Address> {
        self.contracts
            .get(name)
            .copied()
            .ok_or_else(|| FixtureError::AddressBook(format!("no address for {name}")))
    }
}
