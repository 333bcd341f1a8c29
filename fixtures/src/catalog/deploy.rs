use async_trait::async_trait;

use super::FixtureId;
use crate::error::FixtureResult;
use crate::graph::{Fixture, FixtureContext};
use crate::ledger::{ContractHandle, Interface};

/// 引数なしのアーティファクトを`accounts[0]`からデプロイするフィクスチャ
pub struct DeployFixture {
    id: FixtureId,
    artifact: Interface,
}

impl DeployFixture {
    /// `artifact`をデプロイする
    pub fn new(id: FixtureId, artifact: &str) -> Self {
        Self {
            id,
            artifact: Interface::new(artifact),
        }
    }
}

#[async_trait]
impl Fixture for DeployFixture {
    fn id(&self) -> FixtureId {
        self.id
    }

    async fn build(&self, ctx: &FixtureContext<'_>) -> FixtureResult<ContractHandle> {
        let deployer = ctx.deployer().await?;
        let handle = ctx.ledger().deploy(&self.artifact, &[], deployer).await?;
        Ok(handle)
    }
}
