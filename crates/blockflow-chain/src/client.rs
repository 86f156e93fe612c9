//! Chain client abstraction
//!
//! A `ChainClient` is the injected collaborator that talks to a node and
//! signs through the connected wallet. ABI encoding lives behind it; callers
//! only see typed calls.

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use blockflow_types::ChainResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// View calls the blocks need
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadCall {
    /// `eth_getBalance`
    NativeBalance { owner: Address },
    /// ERC-20 `balanceOf(owner)`
    BalanceOf { token: Address, owner: Address },
    /// ERC-20 `allowance(owner, spender)`
    Allowance {
        token: Address,
        owner: Address,
        spender: Address,
    },
    /// wstETH `stEthPerToken()`
    StEthPerToken { wrapper: Address },
    /// Lending pool reserve `currentLiquidityRate` (ray)
    ReserveLiquidityRate { pool: Address, asset: Address },
}

/// State-changing calls the blocks submit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteCall {
    /// ERC-20 `approve(spender, amount)`
    Approve {
        token: Address,
        spender: Address,
        amount: U256,
    },
    /// Lending pool `supply(asset, amount, onBehalfOf, referralCode)`
    Supply {
        pool: Address,
        asset: Address,
        amount: U256,
        on_behalf_of: Address,
        referral_code: u16,
    },
    /// stETH `submit(referral)` carrying `value` wei
    Submit {
        steth: Address,
        value: U256,
        referral: Address,
    },
    /// wstETH `wrap(stETHAmount)`
    Wrap { wrapper: Address, amount: U256 },
}

impl WriteCall {
    /// Short method name for logs
    pub fn method(&self) -> &'static str {
        match self {
            Self::Approve { .. } => "approve",
            Self::Supply { .. } => "supply",
            Self::Submit { .. } => "submit",
            Self::Wrap { .. } => "wrap",
        }
    }

    /// Contract the call is sent to
    pub fn target(&self) -> Address {
        match self {
            Self::Approve { token, .. } => *token,
            Self::Supply { pool, .. } => *pool,
            Self::Submit { steth, .. } => *steth,
            Self::Wrap { wrapper, .. } => *wrapper,
        }
    }
}

/// Handle to a submitted, not yet confirmed transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxHandle {
    pub hash: B256,
}

impl fmt::Display for TxHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.hash)
    }
}

/// Receipt of a confirmed transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub tx_hash: B256,
    pub block_number: u64,
    pub from: Address,
    pub to: Address,
}

/// Lending pool `getUserAccountData` result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserAccountData {
    pub total_collateral_base: U256,
    pub total_debt_base: U256,
    pub available_borrows_base: U256,
    /// Basis points
    pub current_liquidation_threshold: U256,
    /// Basis points
    pub ltv: U256,
    /// 18 decimals; `U256::MAX` without debt
    pub health_factor: U256,
}

/// Trait for chain clients
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Get the client name
    fn name(&self) -> &'static str;

    /// Execute a view call returning a single word
    async fn read(&self, call: ReadCall) -> ChainResult<U256>;

    /// Fetch the lending pool account summary for `user`
    async fn read_account(&self, pool: Address, user: Address) -> ChainResult<UserAccountData>;

    /// Sign (through the wallet) and broadcast a transaction from `from`
    async fn send(&self, from: Address, call: WriteCall) -> ChainResult<TxHandle>;

    /// Wait until the transaction is mined. No timeout; resolves only with a
    /// receipt or an error.
    async fn wait_for_receipt(&self, tx: &TxHandle) -> ChainResult<TxReceipt>;
}
