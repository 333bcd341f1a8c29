//! ステーキング関連の合成フィクスチャ

use async_trait::async_trait;
use tracing::info;

use super::{FixtureId, STAKING_MODULES};
use crate::error::FixtureResult;
use crate::graph::{Fixture, FixtureContext};
use crate::ledger::{ContractHandle, Interface, Token};

/// 既存のVoteDelegatorプロキシの実装を新しいものに差し替える
pub struct VoteDelegatorFixture;

#[async_trait]
impl Fixture for VoteDelegatorFixture {
    fn id(&self) -> FixtureId {
        FixtureId::VoteDelegator
    }

    async fn build(&self, ctx: &FixtureContext<'_>) -> FixtureResult<ContractHandle> {
        let ledger = ctx.ledger();
        let address = ctx.book().address(FixtureId::VoteDelegator.as_str())?;
        let proxy = ledger
            .bind("proxy", address, Interface::new("Proxy_0_5"))
            .await?;

        let deployer = ctx.deployer().await?;
        let implementation = ledger
            .deploy(&Interface::new("VoteDelegator"), &[], deployer)
            .await?;

        let owner = ctx.owner_of(&proxy).await?;
        ledger
            .transact(
                &proxy,
                "replaceImplementation",
                &[Token::from(&implementation)],
                owner,
            )
            .await?;

        let handle = ledger
            .bind(
                FixtureId::VoteDelegator.as_str(),
                proxy.address,
                Interface::new("VoteDelegator"),
            )
            .await?;
        Ok(handle)
    }
}

/// BZRX→OOKIコンバーターをMintCoordinatorのミンターに登録する
pub struct BzrxV2ConverterFixture;

const CONVERTER_DEPENDENCIES: &[FixtureId] = &[FixtureId::MintCoordinator];

#[async_trait]
impl Fixture for BzrxV2ConverterFixture {
    fn id(&self) -> FixtureId {
        FixtureId::BzrxV2Converter
    }

    fn dependencies(&self) -> &[FixtureId] {
        CONVERTER_DEPENDENCIES
    }

    async fn build(&self, ctx: &FixtureContext<'_>) -> FixtureResult<ContractHandle> {
        let ledger = ctx.ledger();
        let address = ctx.book().address(FixtureId::BzrxV2Converter.as_str())?;
        let converter = ledger
            .bind(
                FixtureId::BzrxV2Converter.as_str(),
                address,
                Interface::new("BZRXv2Converter"),
            )
            .await?;

        let coordinator = ctx.dep(FixtureId::MintCoordinator)?;
        let owner = ctx.owner_of(coordinator).await?;
        ledger
            .transact(coordinator, "addMinter", &[Token::from(&converter)], owner)
            .await?;

        Ok(converter)
    }
}

/// モジュール式ステーキングをデプロイし、周辺コントラクトと接続する
pub struct StakingV2Fixture;

// CRV3とPOOL3_GAUGEはビルドでは使わないが、解決順序を保つため依存に含める
const STAKING_V2_DEPENDENCIES: &[FixtureId] = &[
    FixtureId::AdminSettingsImpl,
    FixtureId::RewardsImpl,
    FixtureId::StakeUnstakeImpl,
    FixtureId::PausableGuardianImpl,
    FixtureId::VotingImpl,
    FixtureId::SushiChef,
    FixtureId::OokiEthLp,
    FixtureId::Bzrx,
    FixtureId::BzrxV2Converter,
    FixtureId::Crv3,
    FixtureId::Pool3Gauge,
    FixtureId::VoteDelegator,
];

#[async_trait]
impl Fixture for StakingV2Fixture {
    fn id(&self) -> FixtureId {
        FixtureId::StakingV2
    }

    fn dependencies(&self) -> &[FixtureId] {
        STAKING_V2_DEPENDENCIES
    }

    fn autouse(&self) -> bool {
        true
    }

    async fn build(&self, ctx: &FixtureContext<'_>) -> FixtureResult<ContractHandle> {
        let ledger = ctx.ledger();
        let book = ctx.book();
        let deployer = ctx.deployer().await?;

        let proxy = ledger
            .deploy(&Interface::new("StakingModularProxy"), &[], deployer)
            .await?;
        for (module, _) in STAKING_MODULES {
            let implementation = ctx.dep(*module)?;
            ledger
                .transact(
                    &proxy,
                    "replaceContract",
                    &[Token::from(implementation)],
                    deployer,
                )
                .await?;
        }

        let chef = ctx.dep(FixtureId::SushiChef)?;
        let chef_owner = ctx.owner_of(chef).await?;
        ledger
            .transact(
                chef,
                "set",
                &[
                    Token::from(book.sushi_pool_id),
                    Token::from(book.sushi_alloc_point),
                    Token::Bool(false),
                ],
                chef_owner,
            )
            .await?;
        ledger
            .transact(
                chef,
                "updatePool",
                &[Token::from(book.sushi_pool_id)],
                chef_owner,
            )
            .await?;

        let staking = ledger
            .bind(
                FixtureId::StakingV2.as_str(),
                proxy.address,
                Interface::new("IStakingV2"),
            )
            .await?;
        let staking_owner = ctx.owner_of(&staking).await?;
        let approvals = [
            (FixtureId::OokiEthLp, FixtureId::SushiChef),
            (FixtureId::Bzrx, FixtureId::BzrxV2Converter),
        ];
        for (token, spender) in approvals {
            ledger
                .transact(
                    &staking,
                    "setApprovals",
                    &[
                        Token::from(ctx.dep(token)?),
                        Token::from(ctx.dep(spender)?),
                        Token::MaxUint256,
                    ],
                    staking_owner,
                )
                .await?;
        }

        let delegator = ctx.dep(FixtureId::VoteDelegator)?;
        let delegator_owner = ctx.owner_of(delegator).await?;
        ledger
            .transact(
                delegator,
                "setStaking",
                &[Token::from(&staking)],
                delegator_owner,
            )
            .await?;
        ledger
            .transact(
                &staking,
                "setVoteDelegator",
                &[Token::from(delegator)],
                staking_owner,
            )
            .await?;

        info!(address = %staking.address, "Staking v2 deployed and wired");
        Ok(staking)
    }
}
