//! フィクスチャ依存グラフ
//!
//! 各フィクスチャは依存を`FixtureId`で宣言する。`FixtureGraph`は
//! 実行前に循環と未登録の依存を検出し、深さ優先の後順で解決順序を決める。

mod scope;

pub use scope::ModuleScope;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;

use crate::address_book::AddressBook;
use crate::catalog::FixtureId;
use crate::error::{FixtureError, FixtureResult};
use crate::ledger::{Address, ContractHandle, Ledger, Token};

/// 名前付きでメモ化されるセットアップ手順
#[async_trait]
pub trait Fixture: Send + Sync {
    /// フィクスチャ名
    fn id(&self) -> FixtureId;

    /// 先に解決しておく必要があるフィクスチャ（宣言順に解決される）
    fn dependencies(&self) -> &[FixtureId] {
        &[]
    }

    /// スコープ開始時に自動で解決するか
    fn autouse(&self) -> bool {
        false
    }

    /// 台帳上にフィクスチャを構築する
    async fn build(&self, ctx: &FixtureContext<'_>) -> FixtureResult<ContractHandle>;
}

/// ビルド中のフィクスチャに渡される環境
pub struct FixtureContext<'a> {
    id: FixtureId,
    ledger: &'a dyn Ledger,
    book: &'a AddressBook,
    resolved: &'a HashMap<FixtureId, ContractHandle>,
}

impl<'a> FixtureContext<'a> {
    pub(crate) fn new(
        id: FixtureId,
        ledger: &'a dyn Ledger,
        book: &'a AddressBook,
        resolved: &'a HashMap<FixtureId, ContractHandle>,
    ) -> Self {
        Self {
            id,
            ledger,
            book,
            resolved,
        }
    }

    /// ビルド中のフィクスチャ
    pub fn id(&self) -> FixtureId {
        self.id
    }

    /// 台帳
    pub fn ledger(&self) -> &'a dyn Ledger {
        self.ledger
    }

    /// アドレス帳
    pub fn book(&self) -> &'a AddressBook {
        self.book
    }

    /// 解決済みの依存フィクスチャ
    pub fn dep(&self, dependency: FixtureId) -> FixtureResult<&'a ContractHandle> {
        self.resolved
            .get(&dependency)
            .ok_or(FixtureError::MissingDependency {
                fixture: self.id,
                dependency,
            })
    }

    /// デプロイに使うアカウント（`accounts[0]`）
    pub async fn deployer(&self) -> FixtureResult<Address> {
        self.ledger
            .accounts()
            .await?
            .first()
            .copied()
            .ok_or_else(|| self.invariant("ledger exposes no accounts"))
    }

    /// `owner()`を読む
    pub async fn owner_of(&self, contract: &ContractHandle) -> FixtureResult<Address> {
        self.call_address(contract, "owner").await
    }

    /// アドレスを返すviewを呼ぶ
    pub async fn call_address(
        &self,
        contract: &ContractHandle,
        method: &str,
    ) -> FixtureResult<Address> {
        self.ledger
            .call(contract, method, &[])
            .await?
            .as_address()
            .ok_or_else(|| self.invariant(format!("{}.{method}() is not an address", contract.name)))
    }

    /// 整数を返すviewを呼ぶ
    pub async fn call_uint(&self, contract: &ContractHandle, method: &str) -> FixtureResult<u128> {
        self.ledger
            .call(contract, method, &[])
            .await?
            .as_uint()
            .ok_or_else(|| self.invariant(format!("{}.{method}() is not an integer", contract.name)))
    }

    /// ビルド後の検証失敗
    pub fn invariant(&self, detail: impl Into<String>) -> FixtureError {
        FixtureError::Invariant {
            fixture: self.id,
            detail: detail.into(),
        }
    }

    /// 2つの値が一致することを検証する
    pub fn ensure_eq(&self, what: &str, actual: Token, expected: Token) -> FixtureResult<()> {
        if actual != expected {
            return Err(self.invariant(format!(
                "{what}: expected {expected:?}, got {actual:?}"
            )));
        }
        Ok(())
    }
}

/// 登録済みフィクスチャの集合
#[derive(Default)]
pub struct FixtureGraph {
    fixtures: HashMap<FixtureId, Arc<dyn Fixture>>,
    order: Vec<FixtureId>,
}

impl FixtureGraph {
    /// 空のグラフを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// フィクスチャを登録（同じIDは置き換える）
    pub fn register(&mut self, fixture: impl Fixture + 'static) -> &mut Self {
        self.register_shared(Arc::new(fixture))
    }

    /// 共有済みのフィクスチャを登録
    pub fn register_shared(&mut self, fixture: Arc<dyn Fixture>) -> &mut Self {
        let id = fixture.id();
        if self.fixtures.insert(id, fixture).is_none() {
            self.order.push(id);
        }
        self
    }

    /// IDに対応するフィクスチャ
    pub fn get(&self, id: FixtureId) -> Option<&Arc<dyn Fixture>> {
        self.fixtures.get(&id)
    }

    /// 登録済みか
    pub fn contains(&self, id: FixtureId) -> bool {
        self.fixtures.contains_key(&id)
    }

    /// 登録数
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// 空か
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// 登録順のフィクスチャ
    pub fn fixtures(&self) -> impl Iterator<Item = &Arc<dyn Fixture>> {
        self.order.iter().filter_map(|id| self.fixtures.get(id))
    }

    /// 自動解決されるフィクスチャ（登録順）
    pub fn autouse(&self) -> Vec<FixtureId> {
        self.fixtures()
            .filter(|f| f.autouse())
            .map(|f| f.id())
            .collect()
    }

    /// 全フィクスチャについて依存の欠落と循環を検査する
    pub fn validate(&self) -> FixtureResult<()> {
        let mut done = HashSet::new();
        let mut order = Vec::new();
        for id in &self.order {
            self.visit(*id, &mut Vec::new(), &mut done, &mut order)?;
        }
        Ok(())
    }

    /// `root`とその推移的な依存の解決順序（依存が先）
    pub fn plan(&self, root: FixtureId) -> FixtureResult<Vec<FixtureId>> {
        let mut order = Vec::new();
        self.visit(root, &mut Vec::new(), &mut HashSet::new(), &mut order)?;
        Ok(order)
    }

    fn visit(
        &self,
        id: FixtureId,
        path: &mut Vec<FixtureId>,
        done: &mut HashSet<FixtureId>,
        order: &mut Vec<FixtureId>,
    ) -> FixtureResult<()> {
        if done.contains(&id) {
            return Ok(());
        }
        if let Some(start) = path.iter().position(|p| *p == id) {
            let mut cycle = path[start..].to_vec();
            cycle.push(id);
            return Err(FixtureError::Cycle(cycle));
        }
        let fixture = self.fixtures.get(&id).ok_or(FixtureError::Unregistered(id))?;

        path.push(id);
        for dependency in fixture.dependencies() {
            self.visit(*dependency, path, done, order)?;
        }
        path.pop();

        done.insert(id);
        order.push(id);
        Ok(())
    }
}
