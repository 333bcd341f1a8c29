//! ステーキング/ガバナンスのフィクスチャ定義
//!
//! バインドのみのフィクスチャ、実装モジュールのデプロイ、
//! および`STAKINGv2`と`DAO`の合成セットアップからなる。

mod bind;
mod deploy;
mod governance;
mod staking;

pub use bind::BindFixture;
pub use deploy::DeployFixture;
pub use governance::DaoFixture;
pub use staking::{BzrxV2ConverterFixture, StakingV2Fixture, VoteDelegatorFixture};

use std::fmt;

use crate::graph::FixtureGraph;

/// フィクスチャ名
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FixtureId {
    /// bZxプロトコル本体
    Bzx,
    /// VoteDelegatorプロキシ（実装差し替え済み）
    VoteDelegator,
    /// iBZRX
    IBzrx,
    /// 旧ステーキング
    Staking,
    /// Timelock
    Timelock,
    /// 新しいガバナンス
    Dao,
    /// モジュール式ステーキング
    StakingV2,
    /// BZRX→OOKIコンバーター
    BzrxV2Converter,
    /// MintCoordinator
    MintCoordinator,
    /// CRV
    Crv,
    /// vBZRX
    VBzrx,
    /// SushiSwap MasterChef
    SushiChef,
    /// BZRX
    Bzrx,
    /// Curve 3pool LP
    Crv3,
    /// Curve 3pool gauge
    Pool3Gauge,
    /// iOOKI
    IOoki,
    /// OOKI
    Ooki,
    /// SUSHI
    Sushi,
    /// SushiSwapルーター
    SushiRouter,
    /// OOKI/ETH LP
    OokiEthLp,
    /// iUSDC
    IUsdc,
    /// LoanTokenSettings
    TokenSettings,
    /// AdminSettings実装モジュール
    AdminSettingsImpl,
    /// Rewards実装モジュール
    RewardsImpl,
    /// StakeUnstake実装モジュール
    StakeUnstakeImpl,
    /// StakingPausableGuardian実装モジュール
    PausableGuardianImpl,
    /// Voting実装モジュール
    VotingImpl,
}

impl FixtureId {
    /// テストスイートで使われる名前
    pub fn as_str(&self) -> &'static str {
        match self {
            FixtureId::Bzx => "BZX",
            FixtureId::VoteDelegator => "VOTE_DELEGATOR",
            FixtureId::IBzrx => "iBZRX",
            FixtureId::Staking => "STAKING",
            FixtureId::Timelock => "TIMELOCK",
            FixtureId::Dao => "DAO",
            FixtureId::StakingV2 => "STAKINGv2",
            FixtureId::BzrxV2Converter => "BZRXv2_CONVERTER",
            FixtureId::MintCoordinator => "MINT_COORDINATOR",
            FixtureId::Crv => "CRV",
            FixtureId::VBzrx => "vBZRX",
            FixtureId::SushiChef => "SUSHI_CHEF",
            FixtureId::Bzrx => "BZRX",
            FixtureId::Crv3 => "CRV3",
            FixtureId::Pool3Gauge => "POOL3_GAUGE",
            FixtureId::IOoki => "iOOKI",
            FixtureId::Ooki => "OOKI",
            FixtureId::Sushi => "SUSHI",
            FixtureId::SushiRouter => "SUSHI_ROUTER",
            FixtureId::OokiEthLp => "OOKI_ETH_LP",
            FixtureId::IUsdc => "iUSDC",
            FixtureId::TokenSettings => "TOKEN_SETTINGS",
            FixtureId::AdminSettingsImpl => "ADMIN_SETTINGS_IMPL",
            FixtureId::RewardsImpl => "REWARDS_IMPL",
            FixtureId::StakeUnstakeImpl => "STAKE_UNSTAKE_IMPL",
            FixtureId::PausableGuardianImpl => "PAUSABLE_GUARDIAN_IMPL",
            FixtureId::VotingImpl => "VOTING_IMPL",
        }
    }
}

impl fmt::Display for FixtureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 旧ガバナンス（GovernorBravo）のアドレス帳キー
pub const LEGACY_DAO_KEY: &str = "LEGACY_DAO";

/// バインドのみのフィクスチャと、そのインターフェース
pub const BOUND_CONTRACTS: &[(FixtureId, &str)] = &[
    (FixtureId::Bzx, "IBZx"),
    (FixtureId::IBzrx, "LoanTokenLogicStandard"),
    (FixtureId::Staking, "StakingV1_1"),
    (FixtureId::Timelock, "Timelock"),
    (FixtureId::MintCoordinator, "MintCoordinator"),
    (FixtureId::Crv, "TestToken"),
    (FixtureId::VBzrx, "BZRXVestingToken"),
    (FixtureId::SushiChef, "IMasterChefSushi"),
    (FixtureId::Bzrx, "TestToken"),
    (FixtureId::Crv3, "TestToken"),
    (FixtureId::Pool3Gauge, "ICurve3PoolGauge"),
    (FixtureId::IOoki, "LoanTokenLogicStandard"),
    (FixtureId::Ooki, "TestToken"),
    (FixtureId::Sushi, "TestToken"),
    (FixtureId::SushiRouter, "IPancakeRouter02"),
    (FixtureId::OokiEthLp, "IPancakePair"),
    (FixtureId::IUsdc, "LoanTokenLogicStandard"),
    (FixtureId::TokenSettings, "LoanTokenSettings"),
];

/// ステーキングの実装モジュールと、そのアーティファクト
pub const STAKING_MODULES: &[(FixtureId, &str)] = &[
    (FixtureId::AdminSettingsImpl, "AdminSettings"),
    (FixtureId::RewardsImpl, "Rewards"),
    (FixtureId::StakeUnstakeImpl, "StakeUnstake"),
    (FixtureId::PausableGuardianImpl, "StakingPausableGuardian"),
    (FixtureId::VotingImpl, "Voting"),
];

/// フィクスチャがデプロイするアーティファクト
pub const ARTIFACTS: &[&str] = &[
    "VoteDelegator",
    "StakingModularProxy",
    "AdminSettings",
    "Rewards",
    "StakeUnstake",
    "StakingPausableGuardian",
    "Voting",
    "GovernorBravoDelegate",
    "GovernorBravoDelegator",
];

/// カタログ全体を登録したグラフ
pub fn standard_graph() -> FixtureGraph {
    let mut graph = FixtureGraph::new();
    for (id, interface) in BOUND_CONTRACTS {
        graph.register(BindFixture::new(*id, interface));
    }
    for (id, artifact) in STAKING_MODULES {
        graph.register(DeployFixture::new(*id, artifact));
    }
    graph
        .register(VoteDelegatorFixture)
        .register(BzrxV2ConverterFixture)
        .register(StakingV2Fixture)
        .register(DaoFixture);
    graph
}
