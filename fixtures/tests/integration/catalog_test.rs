//! Integration Test: カタログ全体の解決
//!
//! メインネットのアドレス帳 → フォーク済み台帳 → STAKINGv2/DAOの構築

use std::sync::Arc;

use opsbench_fixtures::catalog::STAKING_MODULES;
use opsbench_fixtures::testing::{forked_ledger, FORK_TIME, TIMELOCK_DELAY_SECS};
use opsbench_fixtures::{
    standard_graph, Address, FixtureError, FixtureId, LedgerError, ModuleScope, Token,
};

use crate::support::{counting, forked, mainnet_book};

#[tokio::test]
async fn test_each_dependency_built_exactly_once() {
    let book = mainnet_book();
    let (_, ledger) = forked(&book);
    let (graph, counter) = counting(&standard_graph());
    let mut scope = ModuleScope::new(&graph, ledger, Arc::new(book));

    scope.setup_autouse().await.unwrap();
    scope.resolve(FixtureId::VoteDelegator).await.unwrap();
    scope.resolve(FixtureId::Dao).await.unwrap();
    scope.resolve(FixtureId::StakingV2).await.unwrap();
    scope.resolve(FixtureId::Dao).await.unwrap();

    let plan = graph.plan(FixtureId::Dao).unwrap();
    for id in &plan {
        assert_eq!(counter.count(*id), 1, "{id} built more than once");
    }
    assert_eq!(counter.snapshot().len(), plan.len());
    assert_eq!(counter.count(FixtureId::Bzx), 0);
}

#[tokio::test]
async fn test_stakingv2_is_wired() {
    let book = mainnet_book();
    let (memory, ledger) = forked(&book);
    let graph = standard_graph();
    let mut scope = ModuleScope::new(&graph, ledger, Arc::new(book.clone()));

    scope.setup_autouse().await.unwrap();

    let staking = scope.get(FixtureId::StakingV2).unwrap().clone();
    let chef = book.address("SUSHI_CHEF").unwrap();
    let delegator = book.address("VOTE_DELEGATOR").unwrap();
    let converter = book.address("BZRXv2_CONVERTER").unwrap();
    let lp = book.address("OOKI_ETH_LP").unwrap();
    let bzrx = book.address("BZRX").unwrap();
    let coordinator = book.address("MINT_COORDINATOR").unwrap();

    assert_eq!(staking.interface.name(), "IStakingV2");
    for (module, _) in STAKING_MODULES {
        let implementation = scope.get(*module).unwrap().address;
        assert_eq!(
            memory.storage_at(staking.address, &format!("module:{implementation}")),
            Some(Token::Bool(true))
        );
    }
    assert_eq!(
        memory.storage_at(chef, "pool:335:allocPoint"),
        Some(Token::Uint(1000))
    );
    assert_eq!(
        memory.storage_at(chef, "pool:335:lastRewardTime"),
        Some(Token::Uint(u128::from(FORK_TIME)))
    );
    assert_eq!(
        memory.storage_at(staking.address, &format!("allowance:{lp}:{chef}")),
        Some(Token::MaxUint256)
    );
    assert_eq!(
        memory.storage_at(staking.address, &format!("allowance:{bzrx}:{converter}")),
        Some(Token::MaxUint256)
    );
    assert_eq!(
        memory.storage_at(delegator, "staking"),
        Some(Token::Address(staking.address))
    );
    assert_eq!(
        memory.storage_at(staking.address, "voteDelegator"),
        Some(Token::Address(delegator))
    );
    assert_eq!(
        memory.storage_at(coordinator, &format!("minter:{converter}")),
        Some(Token::Bool(true))
    );

    let implementation = memory
        .storage_at(delegator, "implementation")
        .and_then(|t| t.as_address())
        .unwrap();
    assert_eq!(memory.code_at(implementation).unwrap().name(), "VoteDelegator");
    assert_eq!(memory.call_count("replaceContract"), STAKING_MODULES.len());
}

#[tokio::test]
async fn test_dao_takes_over_timelock() {
    let book = mainnet_book();
    let (memory, ledger) = forked(&book);
    let graph = standard_graph();
    let mut scope = ModuleScope::new(&graph, ledger.clone(), Arc::new(book.clone()));

    let dao = scope.resolve(FixtureId::Dao).await.unwrap();

    let timelock = book.address("TIMELOCK").unwrap();
    let staking = scope.get(FixtureId::StakingV2).unwrap().address;
    assert_eq!(dao.interface.name(), "GovernorBravoDelegate");
    assert_eq!(
        memory.storage_at(timelock, "admin"),
        Some(Token::Address(dao.address))
    );
    assert_eq!(
        memory.storage_at(timelock, "pendingAdmin"),
        Some(Token::Address(Address::ZERO))
    );
    assert_eq!(
        memory.storage_at(dao.address, "guardian"),
        Some(Token::Address(book.guardian_multisig))
    );
    assert_eq!(
        memory.storage_at(dao.address, "proposalThreshold"),
        Some(Token::Uint(500_000_000_000_000_000))
    );
    assert_eq!(
        memory.storage_at(staking, "governor"),
        Some(Token::Address(dao.address))
    );
    assert_eq!(
        ledger
            .call(scope.get(FixtureId::StakingV2).unwrap(), "owner", &[])
            .await
            .unwrap(),
        Token::Address(timelock)
    );
    assert_eq!(
        ledger.chain_time().await.unwrap(),
        FORK_TIME + TIMELOCK_DELAY_SECS + 100
    );
    assert!(memory.is_impersonated(book.guardian_multisig));
}

#[tokio::test]
async fn test_bind_without_code_aborts_scope() {
    let mut book = mainnet_book();
    let ledger = forked_ledger(&book);
    book.contracts
        .insert("BZX".to_string(), Address::from_low_u64(0xdead));
    let graph = standard_graph();
    let mut scope = ModuleScope::new(&graph, Arc::new(ledger), Arc::new(book));

    let err = scope.resolve(FixtureId::Bzx).await.unwrap_err();
    assert!(matches!(err, FixtureError::Ledger(LedgerError::NoCode(_))));

    let err = scope.resolve(FixtureId::StakingV2).await.unwrap_err();
    assert!(matches!(
        err,
        FixtureError::ScopeAborted {
            failed: FixtureId::Bzx
        }
    ));
}

#[tokio::test]
async fn test_missing_address_fails_root() {
    let mut book = mainnet_book();
    let ledger = forked_ledger(&book);
    book.contracts.remove("SUSHI_CHEF");
    let graph = standard_graph();
    let mut scope = ModuleScope::new(&graph, Arc::new(ledger), Arc::new(book));

    let err = scope.setup_autouse().await.unwrap_err();

    assert!(matches!(err, FixtureError::AddressBook(_)));
    assert_eq!(scope.failed(), Some(FixtureId::SushiChef));
    assert!(scope.get(FixtureId::StakingV2).is_none());
}
