use async_trait::async_trait;

use super::FixtureId;
use crate::error::FixtureResult;
use crate::graph::{Fixture, FixtureContext};
use crate::ledger::{ContractHandle, Interface};

/// アドレス帳のアドレスにインターフェースを付けるだけのフィクスチャ
pub struct BindFixture {
    id: FixtureId,
    interface: Interface,
}

impl BindFixture {
    /// `id`の名前でアドレス帳を引く
    pub fn new(id: FixtureId, interface: &str) -> Self {
        Self {
            id,
            interface: Interface::new(interface),
        }
    }
}

#[async_trait]
impl Fixture for BindFixture {
    fn id(&self) -> FixtureId {
        self.id
    }

    async fn build(&self, ctx: &FixtureContext<'_>) -> FixtureResult<ContractHandle> {
        let address = ctx.book().address(self.id.as_str())?;
        let handle = ctx
            .ledger()
            .bind(self.id.as_str(), address, self.interface.clone())
            .await?;
        Ok(handle)
    }
}
