//! フォーク済みチェーンを模したインメモリ台帳
//!
//! アドレス帳の全コントラクトを配置し、Timelockと旧ガバナンスの状態を
//! メインネット同等に初期化する。

use crate::address_book::AddressBook;
use crate::catalog::{FixtureId, ARTIFACTS, BOUND_CONTRACTS, LEGACY_DAO_KEY};
use crate::ledger::{Address, InMemoryLedger, SeedContract};

/// フォーク時点のブロックタイムスタンプ
pub const FORK_TIME: u64 = 1_650_000_000;
/// Timelockの遅延（2日）
pub const TIMELOCK_DELAY_SECS: u64 = 2 * 24 * 60 * 60;
/// 旧ガバナンスの投票期間（ブロック）
pub const LEGACY_VOTING_PERIOD: u64 = 17_280;
/// 旧ガバナンスの投票遅延（ブロック）
pub const LEGACY_VOTING_DELAY: u64 = 1;

const MAINNET_OWNER_BASE: u64 = 0x0e00_0000;
const SAMPLE_ADDRESS_BASE: u64 = 0x5a00_0000;

/// 既存コントラクトの現在のオーナー（フォーク上の任意アドレス）
pub fn mainnet_owner(index: usize) -> Address {
    Address::from_low_u64(MAINNET_OWNER_BASE + index as u64)
}

/// `book`の内容を配置した台帳
pub fn forked_ledger(book: &AddressBook) -> InMemoryLedger {
    let mut ledger = InMemoryLedger::new(FORK_TIME);
    for artifact in ARTIFACTS {
        ledger = ledger.with_artifact(*artifact);
    }

    let timelock = book.contracts.get(FixtureId::Timelock.as_str()).copied();
    let legacy_dao = book.contracts.get(LEGACY_DAO_KEY).copied();
    let staking = book.contracts.get(FixtureId::Staking.as_str()).copied();

    for (index, (name, address)) in book.contracts.iter().enumerate() {
        let seed = if name == FixtureId::Timelock.as_str() {
            SeedContract::new(*address, "Timelock")
                .slot("admin", legacy_dao.unwrap_or_default())
                .slot("pendingAdmin", Address::ZERO)
                .slot("delay", TIMELOCK_DELAY_SECS)
        } else if name == LEGACY_DAO_KEY {
            SeedContract::new(*address, "GovernorBravoDelegator")
                .owner(mainnet_owner(index))
                .slot("admin", timelock.unwrap_or_default())
                .slot("timelock", timelock.unwrap_or_default())
                .slot("staking", staking.unwrap_or_default())
                .slot("guardian", book.guardian_multisig)
                .slot("votingPeriod", LEGACY_VOTING_PERIOD)
                .slot("votingDelay", LEGACY_VOTING_DELAY)
        } else {
            SeedContract::new(*address, name.as_str()).owner(mainnet_owner(index))
        };
        ledger = ledger.with_contract(seed);
    }
    ledger
}

/// 合成アドレスで埋めたアドレス帳
pub fn sample_address_book() -> AddressBook {
    let names = BOUND_CONTRACTS
        .iter()
        .map(|(id, _)| id.as_str())
        .chain([
            FixtureId::VoteDelegator.as_str(),
            FixtureId::BzrxV2Converter.as_str(),
            LEGACY_DAO_KEY,
        ]);

    names.enumerate().fold(
        AddressBook::new(Address::from_low_u64(SAMPLE_ADDRESS_BASE)),
        |book, (index, name)| {
            book.with_contract(name, Address::from_low_u64(SAMPLE_ADDRESS_BASE + 1 + index as u64))
        },
    )
}
