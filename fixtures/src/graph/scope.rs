//! モジュールスコープ
//!
//! 1つのテストモジュールに対応し、フィクスチャを高々1回ずつビルドして
//! 結果を保持する。最初の失敗でスコープは中断され、以降の解決は拒否される。

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{FixtureContext, FixtureGraph};
use crate::address_book::AddressBook;
use crate::catalog::FixtureId;
use crate::error::{FixtureError, FixtureResult};
use crate::ledger::{ContractHandle, Ledger, SnapshotId};

/// フィクスチャのメモ化キャッシュ
pub struct ModuleScope<'g> {
    graph: &'g FixtureGraph,
    ledger: Arc<dyn Ledger>,
    book: Arc<AddressBook>,
    cache: HashMap<FixtureId, ContractHandle>,
    failed: Option<FixtureId>,
}

impl<'g> ModuleScope<'g> {
    /// 新しいスコープを開始
    pub fn new(graph: &'g FixtureGraph, ledger: Arc<dyn Ledger>, book: Arc<AddressBook>) -> Self {
        Self {
            graph,
            ledger,
            book,
            cache: HashMap::new(),
            failed: None,
        }
    }

    /// 台帳
    pub fn ledger(&self) -> &Arc<dyn Ledger> {
        &self.ledger
    }

    /// アドレス帳
    pub fn book(&self) -> &AddressBook {
        &self.book
    }

    /// 解決済みのハンドル
    pub fn get(&self, id: FixtureId) -> Option<&ContractHandle> {
        self.cache.get(&id)
    }

    /// 解決済みのフィクスチャ数
    pub fn resolved_count(&self) -> usize {
        self.cache.len()
    }

    /// 中断の原因となったフィクスチャ
    pub fn failed(&self) -> Option<FixtureId> {
        self.failed
    }

    /// `id`を依存ごと解決する。解決済みならキャッシュを返す
    pub async fn resolve(&mut self, id: FixtureId) -> FixtureResult<ContractHandle> {
        if let Some(failed) = self.failed {
            return Err(FixtureError::ScopeAborted { failed });
        }
        if let Some(handle) = self.cache.get(&id) {
            debug!(fixture = %id, "Fixture cache hit");
            return Ok(handle.clone());
        }

        let graph = self.graph;
        for step in graph.plan(id)? {
            if self.cache.contains_key(&step) {
                debug!(fixture = %step, "Fixture cache hit");
                continue;
            }
            let fixture = graph.get(step).ok_or(FixtureError::Unregistered(step))?;

            debug!(fixture = %step, "Building fixture");
            let built = {
                let ctx = FixtureContext::new(step, self.ledger.as_ref(), &self.book, &self.cache);
                fixture.build(&ctx).await
            };

            match built {
                Ok(handle) => {
                    debug!(fixture = %step, address = %handle.address, "Fixture built");
                    self.cache.insert(step, handle);
                }
                Err(e) => {
                    warn!(fixture = %step, error = %e, "Fixture failed, aborting module scope");
                    self.failed = Some(step);
                    return Err(e);
                }
            }
        }

        self.cache
            .get(&id)
            .cloned()
            .ok_or(FixtureError::Unregistered(id))
    }

    /// autouseフィクスチャをすべて解決する
    pub async fn setup_autouse(&mut self) -> FixtureResult<()> {
        let autouse = self.graph.autouse();
        info!(count = autouse.len(), "Setting up autouse fixtures");
        for id in autouse {
            self.resolve(id).await?;
        }
        Ok(())
    }

    /// テスト関数の開始時に台帳のスナップショットを取る
    pub async fn begin_isolation(&self) -> FixtureResult<SnapshotId> {
        let snapshot = self.ledger.snapshot().await?;
        debug!(snapshot = snapshot.0, "Isolation started");
        Ok(snapshot)
    }

    /// テスト関数の終了時にスナップショットへ戻す
    pub async fn end_isolation(&self, snapshot: SnapshotId) -> FixtureResult<()> {
        self.ledger.revert(snapshot).await?;
        Ok(())
    }
}
