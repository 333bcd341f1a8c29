//! 新しいガバナンス（GovernorBravo）のセットアップ
//!
//! 新DAOをデプロイし、旧DAO経由でTimelockのadminを移譲する。
//! Timelockの遅延を跨ぐため、チェーン時刻を進める。

use async_trait::async_trait;
use tracing::info;

use super::{FixtureId, LEGACY_DAO_KEY};
use crate::error::FixtureResult;
use crate::graph::{Fixture, FixtureContext};
use crate::ledger::{ContractHandle, Interface, Token};

/// 新しいガバナンスをデプロイし、Timelockのadminにする
pub struct DaoFixture;

const DAO_DEPENDENCIES: &[FixtureId] = &[FixtureId::StakingV2, FixtureId::Timelock];

#[async_trait]
impl Fixture for DaoFixture {
    fn id(&self) -> FixtureId {
        FixtureId::Dao
    }

    fn dependencies(&self) -> &[FixtureId] {
        DAO_DEPENDENCIES
    }

    async fn build(&self, ctx: &FixtureContext<'_>) -> FixtureResult<ContractHandle> {
        let ledger = ctx.ledger();
        let book = ctx.book();
        let staking = ctx.dep(FixtureId::StakingV2)?;
        let timelock = ctx.dep(FixtureId::Timelock)?;

        let legacy_dao = ledger
            .bind(
                LEGACY_DAO_KEY,
                book.address(LEGACY_DAO_KEY)?,
                Interface::new("GovernorBravoDelegate"),
            )
            .await?;

        // デリゲーターのコンストラクタは送信者をguardianにする
        let guardian = ledger.impersonate(book.guardian_multisig).await?;
        let implementation = ledger
            .deploy(&Interface::new("GovernorBravoDelegate"), &[], guardian)
            .await?;
        let voting_period = ctx.call_uint(&legacy_dao, "votingPeriod").await?;
        let voting_delay = ctx.call_uint(&legacy_dao, "votingDelay").await?;
        let delegator = ledger
            .deploy(
                &Interface::new("GovernorBravoDelegator"),
                &[
                    Token::from(timelock),
                    Token::from(staking),
                    Token::from(timelock),
                    Token::from(&implementation),
                    Token::Uint(voting_period),
                    Token::Uint(voting_delay),
                    Token::from(book.proposal_threshold),
                    Token::from(book.quorum_votes),
                ],
                guardian,
            )
            .await?;

        let deployer = ctx.deployer().await?;
        ledger
            .transact(staking, "setGovernor", &[Token::from(&delegator)], deployer)
            .await?;
        ledger
            .transact(
                staking,
                "transferOwnership",
                &[Token::from(timelock)],
                deployer,
            )
            .await?;

        let delay = ctx.call_uint(timelock, "delay").await?;
        let delay = u64::try_from(delay)
            .map_err(|_| ctx.invariant(format!("timelock delay {delay} does not fit in u64")))?;
        let wait = delay
            .checked_add(book.timelock_eta_buffer_secs)
            .ok_or_else(|| ctx.invariant("timelock delay plus eta buffer overflows"))?;
        let eta = ledger
            .chain_time()
            .await?
            .checked_add(wait)
            .ok_or_else(|| ctx.invariant("timelock eta overflows chain time"))?;

        ledger
            .transact(
                &legacy_dao,
                "__queueSetTimelockPendingAdmin",
                &[Token::from(&delegator), Token::from(eta)],
                guardian,
            )
            .await?;
        ledger.advance_time(wait).await?;
        ledger
            .transact(
                &legacy_dao,
                "__executeSetTimelockPendingAdmin",
                &[Token::from(&delegator), Token::from(eta)],
                guardian,
            )
            .await?;

        let dao = ledger
            .bind(
                FixtureId::Dao.as_str(),
                delegator.address,
                Interface::new("GovernorBravoDelegate"),
            )
            .await?;
        ledger.transact(&dao, "__acceptAdmin", &[], guardian).await?;

        ctx.ensure_eq(
            "dao.staking()",
            Token::from(ctx.call_address(&dao, "staking").await?),
            Token::from(staking),
        )?;
        ctx.ensure_eq(
            "dao.admin()",
            Token::from(ctx.call_address(&dao, "admin").await?),
            Token::from(timelock),
        )?;
        ctx.ensure_eq(
            "TIMELOCK.admin()",
            Token::from(ctx.call_address(timelock, "admin").await?),
            Token::from(&dao),
        )?;

        info!(address = %dao.address, eta, "Governance handed over to new DAO");
        Ok(dao)
    }
}
