//! Integration Test: Timelockのadmin移譲
//!
//! 遅延前の実行は失敗し、遅延後は成功して新DAOがadminになる

use std::sync::Arc;

use opsbench_fixtures::catalog::LEGACY_DAO_KEY;
use opsbench_fixtures::testing::TIMELOCK_DELAY_SECS;
use opsbench_fixtures::{
    standard_graph, Address, AddressBook, ContractHandle, FixtureId, Interface, Ledger,
    LedgerError, ModuleScope, Token,
};

use crate::support::{forked, mainnet_book};

struct Governance {
    ledger: Arc<dyn Ledger>,
    legacy: ContractHandle,
    timelock: ContractHandle,
    dao: ContractHandle,
    guardian: Address,
}

async fn deploy_new_dao(book: &AddressBook) -> Governance {
    let (_, ledger) = forked(book);
    let graph = standard_graph();
    let mut scope = ModuleScope::new(&graph, ledger.clone(), Arc::new(book.clone()));
    let staking = scope.resolve(FixtureId::StakingV2).await.unwrap();
    let timelock = scope.resolve(FixtureId::Timelock).await.unwrap();

    let legacy = ledger
        .bind(
            LEGACY_DAO_KEY,
            book.address(LEGACY_DAO_KEY).unwrap(),
            Interface::new("GovernorBravoDelegate"),
        )
        .await
        .unwrap();
    let guardian = ledger.impersonate(book.guardian_multisig).await.unwrap();
    let implementation = ledger
        .deploy(&Interface::new("GovernorBravoDelegate"), &[], guardian)
        .await
        .unwrap();
    let dao = ledger
        .deploy(
            &Interface::new("GovernorBravoDelegator"),
            &[
                Token::from(&timelock),
                Token::from(&staking),
                Token::from(&timelock),
                Token::from(&implementation),
                Token::Uint(17_280),
                Token::Uint(1),
                Token::from(book.proposal_threshold),
                Token::from(book.quorum_votes),
            ],
            guardian,
        )
        .await
        .unwrap();

    Governance {
        ledger,
        legacy,
        timelock,
        dao,
        guardian,
    }
}

fn assert_reverted(err: LedgerError, expected: &str) {
    match err {
        LedgerError::Reverted { reason, .. } => {
            assert!(reason.contains(expected), "unexpected reason: {reason}")
        }
        other => panic!("expected revert, got {other:?}"),
    }
}

#[tokio::test]
async fn test_execute_before_delay_fails_and_after_delay_succeeds() {
    let book = mainnet_book();
    let gov = deploy_new_dao(&book).await;
    let ledger = &gov.ledger;
    let wait = TIMELOCK_DELAY_SECS + 100;
    let eta = ledger.chain_time().await.unwrap() + wait;
    let args = [Token::from(&gov.dao), Token::from(eta)];

    ledger
        .transact(&gov.legacy, "__queueSetTimelockPendingAdmin", &args, gov.guardian)
        .await
        .unwrap();

    let err = ledger
        .transact(&gov.legacy, "__executeSetTimelockPendingAdmin", &args, gov.guardian)
        .await
        .unwrap_err();
    assert_reverted(err, "hasn't surpassed time lock");

    ledger.advance_time(wait).await.unwrap();
    ledger
        .transact(&gov.legacy, "__executeSetTimelockPendingAdmin", &args, gov.guardian)
        .await
        .unwrap();
    assert_eq!(
        ledger.call(&gov.timelock, "pendingAdmin", &[]).await.unwrap(),
        Token::from(&gov.dao)
    );

    ledger
        .transact(&gov.dao, "__acceptAdmin", &[], gov.guardian)
        .await
        .unwrap();
    assert_eq!(
        ledger.call(&gov.timelock, "admin", &[]).await.unwrap(),
        Token::from(&gov.dao)
    );
}

#[tokio::test]
async fn test_queue_rejects_eta_inside_delay() {
    let book = mainnet_book();
    let gov = deploy_new_dao(&book).await;
    let ledger = &gov.ledger;
    let eta = ledger.chain_time().await.unwrap() + TIMELOCK_DELAY_SECS - 1;

    let err = ledger
        .transact(
            &gov.legacy,
            "__queueSetTimelockPendingAdmin",
            &[Token::from(&gov.dao), Token::from(eta)],
            gov.guardian,
        )
        .await
        .unwrap_err();

    assert_reverted(err, "must satisfy delay");
}

#[tokio::test]
async fn test_execute_without_queue_fails() {
    let book = mainnet_book();
    let gov = deploy_new_dao(&book).await;
    let ledger = &gov.ledger;
    let eta = ledger.chain_time().await.unwrap() + TIMELOCK_DELAY_SECS + 100;
    ledger.advance_time(TIMELOCK_DELAY_SECS + 100).await.unwrap();

    let err = ledger
        .transact(
            &gov.legacy,
            "__executeSetTimelockPendingAdmin",
            &[Token::from(&gov.dao), Token::from(eta)],
            gov.guardian,
        )
        .await
        .unwrap_err();

    assert_reverted(err, "hasn't been queued");
}

#[tokio::test]
async fn test_execute_after_grace_period_is_stale() {
    let book = mainnet_book();
    let gov = deploy_new_dao(&book).await;
    let ledger = &gov.ledger;
    let wait = TIMELOCK_DELAY_SECS + 100;
    let eta = ledger.chain_time().await.unwrap() + wait;
    let args = [Token::from(&gov.dao), Token::from(eta)];
    ledger
        .transact(&gov.legacy, "__queueSetTimelockPendingAdmin", &args, gov.guardian)
        .await
        .unwrap();

    ledger.advance_time(wait + 15 * 24 * 60 * 60).await.unwrap();
    let err = ledger
        .transact(&gov.legacy, "__executeSetTimelockPendingAdmin", &args, gov.guardian)
        .await
        .unwrap_err();

    assert_reverted(err, "stale");
}

#[tokio::test]
async fn test_only_guardian_can_queue() {
    let book = mainnet_book();
    let gov = deploy_new_dao(&book).await;
    let ledger = &gov.ledger;
    let stranger = ledger.accounts().await.unwrap()[1];
    let eta = ledger.chain_time().await.unwrap() + TIMELOCK_DELAY_SECS + 100;

    let err = ledger
        .transact(
            &gov.legacy,
            "__queueSetTimelockPendingAdmin",
            &[Token::from(&gov.dao), Token::from(eta)],
            stranger,
        )
        .await
        .unwrap_err();

    assert_reverted(err, "sender must be gov guardian");
}

#[tokio::test]
async fn test_accept_admin_before_execute_fails() {
    let book = mainnet_book();
    let gov = deploy_new_dao(&book).await;

    let err = gov
        .ledger
        .transact(&gov.dao, "__acceptAdmin", &[], gov.guardian)
        .await
        .unwrap_err();

    assert_reverted(err, "Call must come from pendingAdmin");
}
