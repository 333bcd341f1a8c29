//! Integration Test: 関数単位の分離
//!
//! スナップショット → 変更 → リバートで、モジュールスコープの状態が戻ることを確認

use std::sync::Arc;

use opsbench_fixtures::{standard_graph, FixtureId, ModuleScope, Token};

use crate::support::{forked, mainnet_book};

#[tokio::test]
async fn test_end_isolation_restores_ledger() {
    let book = mainnet_book();
    let (memory, ledger) = forked(&book);
    let graph = standard_graph();
    let mut scope = ModuleScope::new(&graph, ledger.clone(), Arc::new(book.clone()));
    scope.setup_autouse().await.unwrap();

    let chef = scope.get(FixtureId::SushiChef).unwrap().clone();
    let chef_owner = ledger.call(&chef, "owner", &[]).await.unwrap();
    let chef_owner = chef_owner.as_address().unwrap();
    let time_before = ledger.chain_time().await.unwrap();

    let snapshot = scope.begin_isolation().await.unwrap();
    ledger
        .transact(
            &chef,
            "set",
            &[Token::Uint(335), Token::Uint(0), Token::Bool(false)],
            chef_owner,
        )
        .await
        .unwrap();
    ledger.advance_time(3600).await.unwrap();
    assert_eq!(
        memory.storage_at(chef.address, "pool:335:allocPoint"),
        Some(Token::Uint(0))
    );

    scope.end_isolation(snapshot).await.unwrap();

    assert_eq!(
        memory.storage_at(chef.address, "pool:335:allocPoint"),
        Some(Token::Uint(1000))
    );
    assert_eq!(ledger.chain_time().await.unwrap(), time_before);
    // キャッシュ済みのハンドルはそのまま使える
    assert_eq!(scope.resolve(FixtureId::SushiChef).await.unwrap(), chef);
}

#[tokio::test]
async fn test_isolation_between_tests_in_same_scope() {
    let book = mainnet_book();
    let (_, ledger) = forked(&book);
    let graph = standard_graph();
    let mut scope = ModuleScope::new(&graph, ledger.clone(), Arc::new(book.clone()));
    scope.setup_autouse().await.unwrap();
    let staking = scope.get(FixtureId::StakingV2).unwrap().clone();
    let deployer = ledger.accounts().await.unwrap()[0];
    let other = ledger.accounts().await.unwrap()[2];

    let first = scope.begin_isolation().await.unwrap();
    ledger
        .transact(&staking, "transferOwnership", &[Token::from(other)], deployer)
        .await
        .unwrap();
    scope.end_isolation(first).await.unwrap();

    let second = scope.begin_isolation().await.unwrap();
    assert_eq!(
        ledger.call(&staking, "owner", &[]).await.unwrap(),
        Token::Address(deployer)
    );
    scope.end_isolation(second).await.unwrap();
}
