//! インメモリ台帳
//!
//! フォーク済みチェーンのうち、フィクスチャが触れる範囲だけを模倣する。
//! 送信者は常にアンロック済みとして扱う（自動インパーソネート）。

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tracing::debug;

use super::{Address, ContractHandle, Interface, Ledger, SnapshotId, Token, TxReceipt};
use crate::error::{LedgerError, LedgerResult};

/// Timelockの猶予期間（14日）
const GRACE_PERIOD_SECS: u64 = 14 * 24 * 60 * 60;
/// ローカルアカウント数
const DEV_ACCOUNT_COUNT: u64 = 10;
const DEV_ACCOUNT_BASE: u64 = 0xacc0_0000;
const DEPLOY_ADDRESS_BASE: u64 = 0xc0de_0000;

const TIMELOCK_CODE: &str = "Timelock";
const GOVERNOR_CODE: &str = "GovernorBravoDelegator";

/// 初期状態として配置するコントラクト
#[derive(Debug, Clone)]
pub struct SeedContract {
    address: Address,
    code: Interface,
    owner: Address,
    storage: BTreeMap<String, Token>,
}

impl SeedContract {
    /// `code`を持つコントラクトを`address`に配置する
    pub fn new(address: Address, code: impl Into<String>) -> Self {
        Self {
            address,
            code: Interface::new(code),
            owner: Address::ZERO,
            storage: BTreeMap::new(),
        }
    }

    /// オーナーを設定
    pub fn owner(mut self, owner: Address) -> Self {
        self.owner = owner;
        self
    }

    /// ストレージの値を設定
    pub fn slot(mut self, key: impl Into<String>, value: impl Into<Token>) -> Self {
        self.storage.insert(key.into(), value.into());
        self
    }
}

/// 台帳に取り込まれたトランザクションの記録
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRecord {
    /// ブロック番号
    pub block: u64,
    /// 送信者
    pub from: Address,
    /// 宛先（デプロイ時は新しいアドレス）
    pub to: Address,
    /// メソッド名（デプロイ時は`constructor`）
    pub method: String,
}

#[derive(Debug, Clone)]
struct Contract {
    code: Interface,
    owner: Address,
    storage: BTreeMap<String, Token>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct QueuedAdminChange {
    timelock: Address,
    pending_admin: Address,
    eta: u64,
}

#[derive(Debug, Clone)]
struct ChainState {
    time: u64,
    block: u64,
    nonce: u64,
    contracts: BTreeMap<Address, Contract>,
    queued: BTreeSet<QueuedAdminChange>,
    impersonated: BTreeSet<Address>,
}

struct Inner {
    state: ChainState,
    snapshots: Vec<(u64, ChainState)>,
    next_snapshot: u64,
    calls: Vec<CallRecord>,
}

/// `Ledger`のインメモリ実装
pub struct InMemoryLedger {
    accounts: Vec<Address>,
    artifacts: BTreeSet<String>,
    inner: Mutex<Inner>,
}

impl InMemoryLedger {
    /// `genesis_time`から始まる空の台帳を作成
    pub fn new(genesis_time: u64) -> Self {
        let accounts = (0..DEV_ACCOUNT_COUNT)
            .map(|i| Address::from_low_u64(DEV_ACCOUNT_BASE + i))
            .collect();
        Self {
            accounts,
            artifacts: BTreeSet::new(),
            inner: Mutex::new(Inner {
                state: ChainState {
                    time: genesis_time,
                    block: 0,
                    nonce: 0,
                    contracts: BTreeMap::new(),
                    queued: BTreeSet::new(),
                    impersonated: BTreeSet::new(),
                },
                snapshots: Vec::new(),
                next_snapshot: 1,
                calls: Vec::new(),
            }),
        }
    }

    /// デプロイ可能なアーティファクトを登録
    pub fn with_artifact(mut self, name: impl Into<String>) -> Self {
        self.artifacts.insert(name.into());
        self
    }

    /// コントラクトを配置
    pub fn with_contract(mut self, seed: SeedContract) -> Self {
        let inner = self.inner.get_mut().unwrap_or_else(PoisonError::into_inner);
        inner.state.contracts.insert(
            seed.address,
            Contract {
                code: seed.code,
                owner: seed.owner,
                storage: seed.storage,
            },
        );
        self
    }

    /// 取り込まれたトランザクションの記録（リバートの影響を受けない）
    pub fn calls(&self) -> Vec<CallRecord> {
        self.lock().calls.clone()
    }

    /// `method`が呼ばれた回数
    pub fn call_count(&self, method: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.method == method)
            .count()
    }

    /// アドレスにあるコードの名前
    pub fn code_at(&self, address: Address) -> Option<Interface> {
        self.lock()
            .state
            .contracts
            .get(&address)
            .map(|c| c.code.clone())
    }

    /// ストレージの値を直接読む
    pub fn storage_at(&self, address: Address, key: &str) -> Option<Token> {
        self.lock()
            .state
            .contracts
            .get(&address)
            .and_then(|c| c.storage.get(key).copied())
    }

    /// インパーソネート済みか
    pub fn is_impersonated(&self, address: Address) -> bool {
        self.lock().state.impersonated.contains(&address)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Ledger for InMemoryLedger {
    async fn accounts(&self) -> LedgerResult<Vec<Address>> {
        Ok(self.accounts.clone())
    }

    async fn impersonate(&self, address: Address) -> LedgerResult<Address> {
        self.lock().state.impersonated.insert(address);
        debug!(address = %address, "Impersonating account");
        Ok(address)
    }

    async fn bind(
        &self,
        name: &str,
        address: Address,
        interface: Interface,
    ) -> LedgerResult<ContractHandle> {
        self.lock().state.contract(address)?;
        Ok(ContractHandle {
            name: name.to_string(),
            address,
            interface,
        })
    }

    async fn deploy(
        &self,
        artifact: &Interface,
        args: &[Token],
        from: Address,
    ) -> LedgerResult<ContractHandle> {
        if !self.artifacts.contains(artifact.name()) {
            return Err(LedgerError::UnknownContract(artifact.name().to_string()));
        }

        let mut inner = self.lock();
        let state = &mut inner.state;
        state.nonce += 1;
        let address = Address::from_low_u64(DEPLOY_ADDRESS_BASE + state.nonce);
        let storage = constructor_storage(state, artifact, args, from)?;
        state.contracts.insert(
            address,
            Contract {
                code: artifact.clone(),
                owner: from,
                storage,
            },
        );
        state.block += 1;
        let block = state.block;
        inner.calls.push(CallRecord {
            block,
            from,
            to: address,
            method: "constructor".to_string(),
        });

        debug!(artifact = %artifact, address = %address, "Deployed contract");
        Ok(ContractHandle {
            name: artifact.name().to_string(),
            address,
            interface: artifact.clone(),
        })
    }

    async fn transact(
        &self,
        contract: &ContractHandle,
        method: &str,
        args: &[Token],
        from: Address,
    ) -> LedgerResult<TxReceipt> {
        let mut inner = self.lock();
        inner.state.execute(contract.address, method, args, from)?;
        inner.state.block += 1;
        let block = inner.state.block;
        inner.calls.push(CallRecord {
            block,
            from,
            to: contract.address,
            method: method.to_string(),
        });

        debug!(contract = %contract.name, method, from = %from, block, "Transaction mined");
        Ok(TxReceipt {
            block,
            from,
            to: contract.address,
            method: method.to_string(),
        })
    }

    async fn call(
        &self,
        contract: &ContractHandle,
        method: &str,
        args: &[Token],
    ) -> LedgerResult<Token> {
        if !args.is_empty() {
            return Err(bad_args(method, "view calls take no arguments"));
        }
        let inner = self.lock();
        let target = inner.state.contract(contract.address)?;
        if method == "owner" {
            return Ok(Token::Address(target.owner));
        }
        target
            .storage
            .get(method)
            .copied()
            .ok_or_else(|| LedgerError::UnknownMethod {
                contract: contract.address,
                method: method.to_string(),
            })
    }

    async fn chain_time(&self) -> LedgerResult<u64> {
        Ok(self.lock().state.time)
    }

    async fn advance_time(&self, seconds: u64) -> LedgerResult<()> {
        let mut inner = self.lock();
        inner.state.time = inner
            .state
            .time
            .checked_add(seconds)
            .ok_or_else(|| bad_args("advance_time", "chain time overflows u64"))?;
        inner.state.block += 1;
        debug!(seconds, time = inner.state.time, "Advanced chain time");
        Ok(())
    }

    async fn snapshot(&self) -> LedgerResult<SnapshotId> {
        let mut inner = self.lock();
        let id = inner.next_snapshot;
        inner.next_snapshot += 1;
        let state = inner.state.clone();
        inner.snapshots.push((id, state));
        Ok(SnapshotId(id))
    }

    async fn revert(&self, snapshot: SnapshotId) -> LedgerResult<()> {
        let mut inner = self.lock();
        let position = inner
            .snapshots
            .iter()
            .position(|(id, _)| *id == snapshot.0)
            .ok_or(LedgerError::UnknownSnapshot(snapshot.0))?;
        let (_, state) = inner.snapshots.swap_remove(position);
        inner.snapshots.truncate(position);
        inner.state = state;
        debug!(snapshot = snapshot.0, "Reverted to snapshot");
        Ok(())
    }
}

fn constructor_storage(
    state: &ChainState,
    artifact: &Interface,
    args: &[Token],
    from: Address,
) -> LedgerResult<BTreeMap<String, Token>> {
    let mut storage = BTreeMap::new();
    match artifact.name() {
        GOVERNOR_CODE => {
            const FIELDS: [&str; 8] = [
                "timelock",
                "staking",
                "admin",
                "implementation",
                "votingPeriod",
                "votingDelay",
                "proposalThreshold",
                "quorumVotes",
            ];
            if args.len() != FIELDS.len() {
                return Err(bad_args(
                    "constructor",
                    &format!("{} expects {} arguments", GOVERNOR_CODE, FIELDS.len()),
                ));
            }
            let implementation = arg_address("constructor", args, 3)?;
            state.contract(implementation)?;
            for (field, value) in FIELDS.iter().zip(args) {
                storage.insert(field.to_string(), *value);
            }
            storage.insert("guardian".to_string(), Token::Address(from));
        }
        TIMELOCK_CODE => {
            let admin = arg_address("constructor", args, 0)?;
            let delay = arg_uint("constructor", args, 1)?;
            storage.insert("admin".to_string(), Token::Address(admin));
            storage.insert("pendingAdmin".to_string(), Token::Address(Address::ZERO));
            storage.insert("delay".to_string(), Token::Uint(delay));
        }
        _ if !args.is_empty() => {
            return Err(bad_args(
                "constructor",
                &format!("{} takes no arguments", artifact),
            ));
        }
        _ => {}
    }
    Ok(storage)
}

impl ChainState {
    fn contract(&self, address: Address) -> LedgerResult<&Contract> {
        self.contracts
            .get(&address)
            .ok_or(LedgerError::NoCode(address))
    }

    fn contract_mut(&mut self, address: Address) -> LedgerResult<&mut Contract> {
        self.contracts
            .get_mut(&address)
            .ok_or(LedgerError::NoCode(address))
    }

    fn write(&mut self, address: Address, key: impl Into<String>, value: Token) -> LedgerResult<()> {
        self.contract_mut(address)?.storage.insert(key.into(), value);
        Ok(())
    }

    fn read_address(&self, address: Address, key: &str, method: &str) -> LedgerResult<Address> {
        self.contract(address)?
            .storage
            .get(key)
            .and_then(Token::as_address)
            .ok_or_else(|| reverted(address, method, &format!("{key} is not set")))
    }

    fn read_uint(&self, address: Address, key: &str, method: &str) -> LedgerResult<u128> {
        self.contract(address)?
            .storage
            .get(key)
            .and_then(Token::as_uint)
            .ok_or_else(|| reverted(address, method, &format!("{key} is not set")))
    }

    fn only_owner(&self, address: Address, method: &str, from: Address) -> LedgerResult<()> {
        if self.contract(address)?.owner != from {
            return Err(reverted(address, method, "Ownable: caller is not the owner"));
        }
        Ok(())
    }

    fn require_code_kind(&self, address: Address, method: &str, code: &str) -> LedgerResult<()> {
        if self.contract(address)?.code.name() != code {
            return Err(LedgerError::UnknownMethod {
                contract: address,
                method: method.to_string(),
            });
        }
        Ok(())
    }

    fn only_guardian(&self, governor: Address, method: &str, from: Address) -> LedgerResult<()> {
        self.require_code_kind(governor, method, GOVERNOR_CODE)?;
        if self.read_address(governor, "guardian", method)? != from {
            return Err(reverted(
                governor,
                method,
                &format!("GovernorBravo::{method}: sender must be gov guardian"),
            ));
        }
        Ok(())
    }

    fn execute(
        &mut self,
        to: Address,
        method: &str,
        args: &[Token],
        from: Address,
    ) -> LedgerResult<()> {
        self.contract(to)?;
        match method {
            "transferOwnership" => {
                self.only_owner(to, method, from)?;
                let owner = arg_address(method, args, 0)?;
                self.contract_mut(to)?.owner = owner;
            }
            "replaceImplementation" => {
                self.only_owner(to, method, from)?;
                let implementation = arg_address(method, args, 0)?;
                self.contract(implementation)?;
                self.write(to, "implementation", Token::Address(implementation))?;
            }
            "replaceContract" => {
                self.only_owner(to, method, from)?;
                let module = arg_address(method, args, 0)?;
                self.contract(module)?;
                self.write(to, format!("module:{module}"), Token::Bool(true))?;
            }
            "set" => {
                self.only_owner(to, method, from)?;
                let pool_id = arg_uint(method, args, 0)?;
                let alloc_point = arg_uint(method, args, 1)?;
                arg_bool(method, args, 2)?;
                self.write(to, format!("pool:{pool_id}:allocPoint"), Token::Uint(alloc_point))?;
            }
            "updatePool" => {
                self.only_owner(to, method, from)?;
                let pool_id = arg_uint(method, args, 0)?;
                let now = u128::from(self.time);
                self.write(to, format!("pool:{pool_id}:lastRewardTime"), Token::Uint(now))?;
            }
            "setApprovals" => {
                self.only_owner(to, method, from)?;
                let token = arg_address(method, args, 0)?;
                let spender = arg_address(method, args, 1)?;
                let amount = arg(method, args, 2)?;
                self.write(to, format!("allowance:{token}:{spender}"), amount)?;
            }
            "setStaking" | "setVoteDelegator" | "setGovernor" => {
                self.only_owner(to, method, from)?;
                let target = arg_address(method, args, 0)?;
                let key = match method {
                    "setStaking" => "staking",
                    "setVoteDelegator" => "voteDelegator",
                    _ => "governor",
                };
                self.write(to, key, Token::Address(target))?;
            }
            "addMinter" => {
                self.only_owner(to, method, from)?;
                let minter = arg_address(method, args, 0)?;
                self.write(to, format!("minter:{minter}"), Token::Bool(true))?;
            }
            "__queueSetTimelockPendingAdmin" => {
                self.only_guardian(to, method, from)?;
                let pending_admin = arg_address(method, args, 0)?;
                let eta = arg_uint(method, args, 1)?;
                let timelock = self.read_address(to, "timelock", method)?;
                self.queue_admin_change(timelock, to, pending_admin, eta)?;
            }
            "__executeSetTimelockPendingAdmin" => {
                self.only_guardian(to, method, from)?;
                let pending_admin = arg_address(method, args, 0)?;
                let eta = arg_uint(method, args, 1)?;
                let timelock = self.read_address(to, "timelock", method)?;
                self.execute_admin_change(timelock, to, pending_admin, eta)?;
            }
            "__acceptAdmin" => {
                self.only_guardian(to, method, from)?;
                let timelock = self.read_address(to, "timelock", method)?;
                self.accept_admin(timelock, to)?;
            }
            "acceptAdmin" => {
                self.accept_admin(to, from)?;
            }
            _ => {
                return Err(LedgerError::UnknownMethod {
                    contract: to,
                    method: method.to_string(),
                })
            }
        }
        Ok(())
    }

    fn queue_admin_change(
        &mut self,
        timelock: Address,
        sender: Address,
        pending_admin: Address,
        eta: u128,
    ) -> LedgerResult<()> {
        const METHOD: &str = "queueTransaction";
        self.require_code_kind(timelock, METHOD, TIMELOCK_CODE)?;
        if self.read_address(timelock, "admin", METHOD)? != sender {
            return Err(reverted(
                timelock,
                METHOD,
                "Timelock::queueTransaction: Call must come from admin.",
            ));
        }
        let delay = self.read_uint(timelock, "delay", METHOD)?;
        let earliest = u128::from(self.time)
            .checked_add(delay)
            .ok_or_else(|| bad_args(METHOD, "timelock delay overflows"))?;
        if eta < earliest {
            return Err(reverted(
                timelock,
                METHOD,
                "Timelock::queueTransaction: Estimated execution block must satisfy delay.",
            ));
        }
        let eta = u64::try_from(eta).map_err(|_| bad_args(METHOD, "eta out of range"))?;
        self.queued.insert(QueuedAdminChange {
            timelock,
            pending_admin,
            eta,
        });
        Ok(())
    }

    fn execute_admin_change(
        &mut self,
        timelock: Address,
        sender: Address,
        pending_admin: Address,
        eta: u128,
    ) -> LedgerResult<()> {
        const METHOD: &str = "executeTransaction";
        self.require_code_kind(timelock, METHOD, TIMELOCK_CODE)?;
        if self.read_address(timelock, "admin", METHOD)? != sender {
            return Err(reverted(
                timelock,
                METHOD,
                "Timelock::executeTransaction: Call must come from admin.",
            ));
        }
        let eta = u64::try_from(eta).map_err(|_| bad_args(METHOD, "eta out of range"))?;
        let key = QueuedAdminChange {
            timelock,
            pending_admin,
            eta,
        };
        if !self.queued.contains(&key) {
            return Err(reverted(
                timelock,
                METHOD,
                "Timelock::executeTransaction: Transaction hasn't been queued.",
            ));
        }
        if self.time < eta {
            return Err(reverted(
                timelock,
                METHOD,
                "Timelock::executeTransaction: Transaction hasn't surpassed time lock.",
            ));
        }
        if self.time > eta.saturating_add(GRACE_PERIOD_SECS) {
            return Err(reverted(
                timelock,
                METHOD,
                "Timelock::executeTransaction: Transaction is stale.",
            ));
        }
        self.queued.remove(&key);
        self.write(timelock, "pendingAdmin", Token::Address(pending_admin))
    }

    fn accept_admin(&mut self, timelock: Address, sender: Address) -> LedgerResult<()> {
        const METHOD: &str = "acceptAdmin";
        self.require_code_kind(timelock, METHOD, TIMELOCK_CODE)?;
        if self.read_address(timelock, "pendingAdmin", METHOD)? != sender {
            return Err(reverted(
                timelock,
                METHOD,
                "Timelock::acceptAdmin: Call must come from pendingAdmin.",
            ));
        }
        self.write(timelock, "admin", Token::Address(sender))?;
        self.write(timelock, "pendingAdmin", Token::Address(Address::ZERO))
    }
}

fn reverted(contract: Address, method: &str, reason: &str) -> LedgerError {
    LedgerError::Reverted {
        contract,
        method: method.to_string(),
        reason: reason.to_string(),
    }
}

fn bad_args(method: &str, reason: &str) -> LedgerError {
    LedgerError::BadArguments {
        method: method.to_string(),
        reason: reason.to_string(),
    }
}

fn arg(method: &str, args: &[Token], index: usize) -> LedgerResult<Token> {
    args.get(index)
        .copied()
        .ok_or_else(|| bad_args(method, &format!("missing argument {index}")))
}

fn arg_address(method: &str, args: &[Token], index: usize) -> LedgerResult<Address> {
    arg(method, args, index)?
        .as_address()
        .ok_or_else(|| bad_args(method, &format!("argument {index} must be an address")))
}

fn arg_uint(method: &str, args: &[Token], index: usize) -> LedgerResult<u128> {
    arg(method, args, index)?
        .as_uint()
        .ok_or_else(|| bad_args(method, &format!("argument {index} must be an integer")))
}

fn arg_bool(method: &str, args: &[Token], index: usize) -> LedgerResult<bool> {
    match arg(method, args, index)? {
        Token::Bool(value) => Ok(value),
        _ => Err(bad_args(method, &format!("argument {index} must be a bool"))),
    }
}
