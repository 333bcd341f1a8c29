//! 台帳（チェーン）の抽象化
//!
//! フィクスチャは`Ledger`トレイト経由でのみチェーンに触れる。
//! ABIエンコードやトランザクション署名は実装側の責務。

mod memory;

pub use memory::{CallRecord, InMemoryLedger, SeedContract};

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LedgerResult;

/// 20バイトのアカウント/コントラクトアドレス
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address([u8; 20]);

impl Address {
    /// ゼロアドレス
    pub const ZERO: Address = Address([0u8; 20]);

    /// バイト列から作成
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// 下位8バイトに`n`を詰めたアドレス（テスト用アカウントや生成アドレス向け）
    pub fn from_low_u64(n: u64) -> Self {
        let mut bytes = [0u8; 20];
        bytes[12..].copy_from_slice(&n.to_be_bytes());
        Self(bytes)
    }

    /// 生のバイト列
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// ゼロアドレスか
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| format!("address must start with 0x: {s}"))?;
        if digits.len() != 40 {
            return Err(format!("address must have 40 hex digits: {s}"));
        }
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(digits, &mut bytes).map_err(|e| format!("{s}: {e}"))?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for Address {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.to_string()
    }
}

/// コントラクトのインターフェース（ABI）名
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Interface(String);

impl Interface {
    /// インターフェース名から作成
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// インターフェース名
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 型付きのコントラクト参照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractHandle {
    /// 表示名
    pub name: String,
    /// アドレス
    pub address: Address,
    /// 呼び出しに使うインターフェース
    pub interface: Interface,
}

/// 呼び出し引数と戻り値
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// アドレス
    Address(Address),
    /// 符号なし整数
    Uint(u128),
    /// 真偽値
    Bool(bool),
    /// 2^256 - 1（無制限のallowance）
    MaxUint256,
}

impl Token {
    /// アドレスとして取り出す
    pub fn as_address(&self) -> Option<Address> {
        match self {
            Token::Address(address) => Some(*address),
            _ => None,
        }
    }

    /// 整数として取り出す
    pub fn as_uint(&self) -> Option<u128> {
        match self {
            Token::Uint(value) => Some(*value),
            _ => None,
        }
    }
}

impl From<Address> for Token {
    fn from(value: Address) -> Self {
        Token::Address(value)
    }
}

impl From<&ContractHandle> for Token {
    fn from(value: &ContractHandle) -> Self {
        Token::Address(value.address)
    }
}

impl From<u128> for Token {
    fn from(value: u128) -> Self {
        Token::Uint(value)
    }
}

impl From<u64> for Token {
    fn from(value: u64) -> Self {
        Token::Uint(u128::from(value))
    }
}

impl From<bool> for Token {
    fn from(value: bool) -> Self {
        Token::Bool(value)
    }
}

/// 送信済みトランザクションの結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    /// 取り込まれたブロック番号
    pub block: u64,
    /// 送信者
    pub from: Address,
    /// 宛先
    pub to: Address,
    /// メソッド名
    pub method: String,
}

/// 台帳スナップショットの識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SnapshotId(pub u64);

/// チェーン操作の抽象化
#[async_trait]
pub trait Ledger: Send + Sync {
    /// ローカルで署名可能なアカウント一覧
    async fn accounts(&self) -> LedgerResult<Vec<Address>>;

    /// 任意アドレスからの送信を許可する
    async fn impersonate(&self, address: Address) -> LedgerResult<Address>;

    /// 既存コントラクトにインターフェースを付けて参照する（状態は変えない）
    async fn bind(
        &self,
        name: &str,
        address: Address,
        interface: Interface,
    ) -> LedgerResult<ContractHandle>;

    /// アーティファクトをデプロイする
    async fn deploy(
        &self,
        artifact: &Interface,
        args: &[Token],
        from: Address,
    ) -> LedgerResult<ContractHandle>;

    /// 状態を変更するトランザクションを送信する
    async fn transact(
        &self,
        contract: &ContractHandle,
        method: &str,
        args: &[Token],
        from: Address,
    ) -> LedgerResult<TxReceipt>;

    /// 読み取り専用の呼び出し
    async fn call(&self, contract: &ContractHandle, method: &str, args: &[Token])
        -> LedgerResult<Token>;

    /// 最新ブロックのタイムスタンプ（秒）
    async fn chain_time(&self) -> LedgerResult<u64>;

    /// チェーン時刻を進めてブロックを1つ採掘する
    async fn advance_time(&self, seconds: u64) -> LedgerResult<()>;

    /// 現在の状態を保存する
    async fn snapshot(&self) -> LedgerResult<SnapshotId>;

    /// 保存した状態に戻す（以降のスナップショットは破棄される）
    async fn revert(&self, snapshot: SnapshotId) -> LedgerResult<()>;
}
