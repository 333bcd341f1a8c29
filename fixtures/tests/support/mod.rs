//! フィクスチャ統合テスト用のサポート

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use opsbench_fixtures::testing::forked_ledger;
use opsbench_fixtures::{
    AddressBook, ContractHandle, Fixture, FixtureContext, FixtureGraph, FixtureId, FixtureResult,
    InMemoryLedger, Ledger,
};

/// リポジトリ同梱のメインネットのアドレス帳
pub fn mainnet_book() -> AddressBook {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/mainnet.toml");
    AddressBook::from_file(&path).unwrap()
}

/// フォーク済み台帳（具象型とトレイトオブジェクトの両方）
pub fn forked(book: &AddressBook) -> (Arc<InMemoryLedger>, Arc<dyn Ledger>) {
    let ledger = Arc::new(forked_ledger(book));
    let shared: Arc<dyn Ledger> = ledger.clone();
    (ledger, shared)
}

/// フィクスチャごとのビルド回数
#[derive(Clone, Default)]
pub struct BuildCounter(Arc<Mutex<HashMap<FixtureId, usize>>>);

impl BuildCounter {
    pub fn count(&self, id: FixtureId) -> usize {
        self.0.lock().unwrap().get(&id).copied().unwrap_or(0)
    }

    #[allow(dead_code)]
    pub fn snapshot(&self) -> HashMap<FixtureId, usize> {
        self.0.lock().unwrap().clone()
    }
}

/// ビルド回数を数えるラッパー
struct CountingFixture {
    inner: Arc<dyn Fixture>,
    counter: BuildCounter,
}

#[async_trait]
impl Fixture for CountingFixture {
    fn id(&self) -> FixtureId {
        self.inner.id()
    }

    fn dependencies(&self) -> &[FixtureId] {
        self.inner.dependencies()
    }

    fn autouse(&self) -> bool {
        self.inner.autouse()
    }

    async fn build(&self, ctx: &FixtureContext<'_>) -> FixtureResult<ContractHandle> {
        *self.counter.0.lock().unwrap().entry(self.id()).or_insert(0) += 1;
        self.inner.build(ctx).await
    }
}

/// 全フィクスチャをカウント付きでラップしたグラフ
#[allow(dead_code)]
pub fn counting(graph: &FixtureGraph) -> (FixtureGraph, BuildCounter) {
    let counter = BuildCounter::default();
    let mut wrapped = FixtureGraph::new();
    for fixture in graph.fixtures() {
        wrapped.register(CountingFixture {
            inner: fixture.clone(),
            counter: counter.clone(),
        });
    }
    (wrapped, counter)
}
