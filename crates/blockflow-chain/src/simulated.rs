//! In-memory chain for the demo, the TUI and tests.
//!
//! Balances, allowances, the stETH/wstETH rate and supplied collateral live
//! in a single ledger. Transactions are queued on `send` and their effects are
//! applied when the receipt is awaited, reverting the way the real contracts
//! would on missing balance or allowance. Faults can be injected to exercise
//! every failure path of the block workflows.

use std::collections::HashMap;
use std::time::Duration;

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use blockflow_types::{ChainError, ChainResult, TokenAmount};
use parking_lot::Mutex;
use sha3::{Digest, Keccak256};
use tokio::sync::watch;

use crate::client::*;
use crate::contracts::NetworkContracts;

/// stETH per wstETH used until a test overrides it
const DEFAULT_STETH_PER_TOKEN: u128 = 1_180_000_000_000_000_000;

/// Demo reserve liquidity rate: 2.75 % in ray
const DEFAULT_LIQUIDITY_RATE: u128 = 27_500_000_000_000_000_000_000_000;

/// Simulated loan-to-value and liquidation threshold, basis points
const LTV_BPS: u64 = 7_000;
const LIQUIDATION_THRESHOLD_BPS: u64 = 7_500;

#[derive(Debug, Clone)]
struct PendingTx {
    from: Address,
    call: WriteCall,
    revert: bool,
}

#[derive(Debug, Default)]
struct Faults {
    offline: bool,
    reject_signatures: u32,
    revert_transactions: u32,
}

#[derive(Debug)]
struct Ledger {
    native: HashMap<Address, U256>,
    /// (token, owner) → balance
    erc20: HashMap<(Address, Address), U256>,
    /// (token, owner, spender) → allowance
    allowances: HashMap<(Address, Address, Address), U256>,
    /// (asset, user) → supplied to the pool
    supplied: HashMap<(Address, Address), U256>,
    steth_per_token: U256,
    liquidity_rate: U256,
    pending: HashMap<B256, PendingTx>,
    receipts: HashMap<B256, TxReceipt>,
    submitted: Vec<(Address, WriteCall)>,
    nonce: u64,
    block_number: u64,
    faults: Faults,
}

impl Ledger {
    fn new() -> Self {
        Self {
            native: HashMap::new(),
            erc20: HashMap::new(),
            allowances: HashMap::new(),
            supplied: HashMap::new(),
            steth_per_token: U256::from(DEFAULT_STETH_PER_TOKEN),
            liquidity_rate: U256::from(DEFAULT_LIQUIDITY_RATE),
            pending: HashMap::new(),
            receipts: HashMap::new(),
            submitted: Vec::new(),
            nonce: 0,
            block_number: 1,
            faults: Faults::default(),
        }
    }

    fn erc20(&self, token: Address, owner: Address) -> U256 {
        self.erc20.get(&(token, owner)).copied().unwrap_or_default()
    }

    fn allowance(&self, token: Address, owner: Address, spender: Address) -> U256 {
        self.allowances
            .get(&(token, owner, spender))
            .copied()
            .unwrap_or_default()
    }

    /// Pull `amount` of `token` from `owner` on behalf of `spender`.
    fn transfer_from(
        &mut self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> ChainResult<()> {
        let allowance = self.allowance(token, owner, spender);
        if allowance < amount {
            return Err(ChainError::reverted("ERC20: insufficient allowance"));
        }
        let balance = self.erc20(token, owner);
        if balance < amount {
            return Err(ChainError::reverted("ERC20: transfer amount exceeds balance"));
        }
        // Infinite approvals are not consumed
        if allowance != U256::MAX {
            self.allowances.insert((token, owner, spender), allowance - amount);
        }
        self.erc20.insert((token, owner), balance - amount);
        Ok(())
    }

    fn credit(&mut self, token: Address, owner: Address, amount: U256) {
        let entry = self.erc20.entry((token, owner)).or_default();
        *entry = entry.saturating_add(amount);
    }

    fn apply(&mut self, contracts: &NetworkContracts, from: Address, call: &WriteCall) -> ChainResult<()> {
        match call {
            WriteCall::Approve { token, spender, amount } => {
                self.allowances.insert((*token, from, *spender), *amount);
            }
            WriteCall::Supply { pool, asset, amount, on_behalf_of, .. } => {
                if *pool != contracts.pool {
                    return Err(ChainError::reverted("call to non-pool contract"));
                }
                self.transfer_from(*asset, from, *pool, *amount)?;
                let entry = self.supplied.entry((*asset, *on_behalf_of)).or_default();
                *entry = entry.saturating_add(*amount);
            }
            WriteCall::Submit { steth, value, .. } => {
                if *steth != contracts.steth {
                    return Err(ChainError::reverted("call to non-staking contract"));
                }
                let balance = self.native.get(&from).copied().unwrap_or_default();
                if balance < *value {
                    return Err(ChainError::reverted("insufficient funds for transfer"));
                }
                if value.is_zero() {
                    return Err(ChainError::reverted("ZERO_DEPOSIT"));
                }
                self.native.insert(from, balance - *value);
                self.credit(*steth, from, *value);
            }
            WriteCall::Wrap { wrapper, amount } => {
                if *wrapper != contracts.wsteth {
                    return Err(ChainError::reverted("call to non-wrapper contract"));
                }
                let wrapped = TokenAmount::from_wei(*amount)
                    .div_by_rate(&TokenAmount::from_wei(self.steth_per_token))
                    .ok_or_else(|| ChainError::reverted("wrap rate unavailable"))?;
                self.transfer_from(contracts.steth, from, *wrapper, *amount)?;
                self.credit(*wrapper, from, wrapped.wei());
            }
        }
        Ok(())
    }
}

/// In-memory `ChainClient`
pub struct SimulatedChain {
    contracts: NetworkContracts,
    ledger: Mutex<Ledger>,
    confirm_delay: Duration,
    confirmations_open: watch::Sender<bool>,
}

impl SimulatedChain {
    /// Empty chain with instant confirmations
    pub fn new(contracts: NetworkContracts) -> Self {
        let (confirmations_open, _) = watch::channel(true);
        Self {
            contracts,
            ledger: Mutex::new(Ledger::new()),
            confirm_delay: Duration::ZERO,
            confirmations_open,
        }
    }

    /// Delay every confirmation by `delay` to mimic block times
    pub fn with_confirm_delay(mut self, delay: Duration) -> Self {
        self.confirm_delay = delay;
        self
    }

    pub fn contracts(&self) -> &NetworkContracts {
        &self.contracts
    }

    // ── Seeding ──────────────────────────────────────────────────────────────

    /// Give `owner` native ETH
    pub fn fund_native(&self, owner: Address, amount: TokenAmount) {
        self.ledger.lock().native.insert(owner, amount.wei());
    }

    /// Set `owner`'s ERC-20 balance
    pub fn mint(&self, token: Address, owner: Address, amount: TokenAmount) {
        self.ledger.lock().erc20.insert((token, owner), amount.wei());
    }

    /// Set an allowance directly, without a transaction
    pub fn set_allowance(&self, token: Address, owner: Address, spender: Address, amount: TokenAmount) {
        self.ledger
            .lock()
            .allowances
            .insert((token, owner, spender), amount.wei());
    }

    pub fn set_steth_per_token(&self, rate: TokenAmount) {
        self.ledger.lock().steth_per_token = rate.wei();
    }

    pub fn set_liquidity_rate(&self, ray: U256) {
        self.ledger.lock().liquidity_rate = ray;
    }

    // ── Fault injection ──────────────────────────────────────────────────────

    /// Fail every call with `NetworkUnavailable` while offline
    pub fn set_offline(&self, offline: bool) {
        self.ledger.lock().faults.offline = offline;
    }

    /// Decline the next signature request
    pub fn reject_next_signature(&self) {
        self.ledger.lock().faults.reject_signatures += 1;
    }

    /// Revert the next submitted transaction at confirmation
    pub fn revert_next_transaction(&self) {
        self.ledger.lock().faults.revert_transactions += 1;
    }

    /// Hold every confirmation until `release_confirmations`
    pub fn hold_confirmations(&self) {
        self.confirmations_open.send_replace(false);
    }

    pub fn release_confirmations(&self) {
        self.confirmations_open.send_replace(true);
    }

    // ── Inspection ───────────────────────────────────────────────────────────

    pub fn native_balance_of(&self, owner: Address) -> TokenAmount {
        TokenAmount::from_wei(self.ledger.lock().native.get(&owner).copied().unwrap_or_default())
    }

    pub fn balance_of(&self, token: Address, owner: Address) -> TokenAmount {
        TokenAmount::from_wei(self.ledger.lock().erc20(token, owner))
    }

    pub fn allowance_of(&self, token: Address, owner: Address, spender: Address) -> TokenAmount {
        TokenAmount::from_wei(self.ledger.lock().allowance(token, owner, spender))
    }

    pub fn supplied_of(&self, asset: Address, user: Address) -> TokenAmount {
        TokenAmount::from_wei(
            self.ledger
                .lock()
                .supplied
                .get(&(asset, user))
                .copied()
                .unwrap_or_default(),
        )
    }

    /// Every transaction accepted by `send`, in order
    pub fn submitted_calls(&self) -> Vec<(Address, WriteCall)> {
        self.ledger.lock().submitted.clone()
    }

    /// Transactions sent but not yet confirmed
    pub fn pending_count(&self) -> usize {
        self.ledger.lock().pending.len()
    }

    fn check_online(&self) -> ChainResult<()> {
        if self.ledger.lock().faults.offline {
            return Err(ChainError::network("simulated node unreachable"));
        }
        Ok(())
    }
}

#[async_trait]
impl ChainClient for SimulatedChain {
    fn name(&self) -> &'static str {
        "simulated"
    }

    async fn read(&self, call: ReadCall) -> ChainResult<U256> {
        self.check_online()?;
        let ledger = self.ledger.lock();
        let value = match call {
            ReadCall::NativeBalance { owner } => ledger.native.get(&owner).copied().unwrap_or_default(),
            ReadCall::BalanceOf { token, owner } => ledger.erc20(token, owner),
            ReadCall::Allowance { token, owner, spender } => ledger.allowance(token, owner, spender),
            ReadCall::StEthPerToken { wrapper } => {
                if wrapper != self.contracts.wsteth {
                    return Err(ChainError::read("stEthPerToken on non-wrapper contract"));
                }
                ledger.steth_per_token
            }
            ReadCall::ReserveLiquidityRate { pool, asset } => {
                if pool != self.contracts.pool || asset != self.contracts.supply_asset {
                    return Err(ChainError::read("reserve not listed"));
                }
                ledger.liquidity_rate
            }
        };
        Ok(value)
    }

    async fn read_account(&self, pool: Address, user: Address) -> ChainResult<UserAccountData> {
        self.check_online()?;
        if pool != self.contracts.pool {
            return Err(ChainError::read("getUserAccountData on non-pool contract"));
        }
        let ledger = self.ledger.lock();
        let collateral = ledger
            .supplied
            .iter()
            .filter(|((_, owner), _)| *owner == user)
            .fold(U256::ZERO, |acc, (_, amount)| acc.saturating_add(*amount));
        let available = collateral.saturating_mul(U256::from(LTV_BPS)) / U256::from(10_000u64);
        Ok(UserAccountData {
            total_collateral_base: collateral,
            total_debt_base: U256::ZERO,
            available_borrows_base: available,
            current_liquidation_threshold: U256::from(LIQUIDATION_THRESHOLD_BPS),
            ltv: U256::from(LTV_BPS),
            health_factor: U256::MAX,
        })
    }

    async fn send(&self, from: Address, call: WriteCall) -> ChainResult<TxHandle> {
        self.check_online()?;
        let mut ledger = self.ledger.lock();
        if ledger.faults.reject_signatures > 0 {
            ledger.faults.reject_signatures -= 1;
            return Err(ChainError::SignatureRejected);
        }
        let revert = if ledger.faults.revert_transactions > 0 {
            ledger.faults.revert_transactions -= 1;
            true
        } else {
            false
        };

        ledger.nonce += 1;
        let mut hasher = Keccak256::new();
        hasher.update(from.as_slice());
        hasher.update(ledger.nonce.to_be_bytes());
        hasher.update(call.method().as_bytes());
        let hash = B256::from_slice(&hasher.finalize());

        ledger.submitted.push((from, call.clone()));
        ledger.pending.insert(hash, PendingTx { from, call, revert });
        Ok(TxHandle { hash })
    }

    async fn wait_for_receipt(&self, tx: &TxHandle) -> ChainResult<TxReceipt> {
        let mut gate = self.confirmations_open.subscribe();
        let opened = gate.wait_for(|open| *open).await.map(|_| ());
        if opened.is_err() {
            return Err(ChainError::network("simulated chain shut down"));
        }
        if !self.confirm_delay.is_zero() {
            tokio::time::sleep(self.confirm_delay).await;
        }

        let mut ledger = self.ledger.lock();
        if let Some(receipt) = ledger.receipts.get(&tx.hash) {
            return Ok(receipt.clone());
        }
        let pending = ledger
            .pending
            .remove(&tx.hash)
            .ok_or_else(|| ChainError::UnknownTransaction {
                tx_hash: tx.hash.to_string(),
            })?;

        if pending.revert {
            return Err(ChainError::reverted("execution reverted"));
        }
        ledger.apply(&self.contracts, pending.from, &pending.call)?;

        ledger.block_number += 1;
        let receipt = TxReceipt {
            tx_hash: tx.hash,
            block_number: ledger.block_number,
            from: pending.from,
            to: pending.call.target(),
        };
        ledger.receipts.insert(tx.hash, receipt.clone());
        Ok(receipt)
    }
}

impl std::fmt::Debug for SimulatedChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedChain")
            .field("chain_id", &self.contracts.chain_id)
            .field("confirm_delay", &self.confirm_delay)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> (SimulatedChain, NetworkContracts, Address) {
        let contracts = NetworkContracts::sepolia();
        (SimulatedChain::new(contracts), contracts, Address::repeat_byte(0x42))
    }

    async fn confirm(chain: &SimulatedChain, from: Address, call: WriteCall) -> ChainResult<TxReceipt> {
        let tx = chain.send(from, call).await?;
        chain.wait_for_receipt(&tx).await
    }

    #[tokio::test]
    async fn test_supply_without_allowance_reverts() {
        let (chain, c, user) = chain();
        chain.mint(c.supply_asset, user, TokenAmount::from_tokens(1));
        let err = confirm(
            &chain,
            user,
            WriteCall::Supply {
                pool: c.pool,
                asset: c.supply_asset,
                amount: TokenAmount::from_tokens(1).wei(),
                on_behalf_of: user,
                referral_code: 0,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ChainError::TransactionReverted { .. }));
        assert_eq!(chain.balance_of(c.supply_asset, user), TokenAmount::from_tokens(1));
    }

    #[tokio::test]
    async fn test_stake_and_wrap_moves_balances() {
        let (chain, c, user) = chain();
        chain.fund_native(user, TokenAmount::from_tokens(3));
        chain.set_steth_per_token(TokenAmount::from_decimal_str("1.25").unwrap());
        let amount = TokenAmount::from_decimal_str("2.5").unwrap();

        confirm(&chain, user, WriteCall::Submit { steth: c.steth, value: amount.wei(), referral: user })
            .await
            .unwrap();
        confirm(&chain, user, WriteCall::Approve { token: c.steth, spender: c.wsteth, amount: amount.wei() })
            .await
            .unwrap();
        confirm(&chain, user, WriteCall::Wrap { wrapper: c.wsteth, amount: amount.wei() })
            .await
            .unwrap();

        assert_eq!(chain.native_balance_of(user), TokenAmount::from_decimal_str("0.5").unwrap());
        assert_eq!(chain.balance_of(c.steth, user), TokenAmount::ZERO);
        assert_eq!(chain.balance_of(c.wsteth, user), TokenAmount::from_tokens(2));
        assert_eq!(chain.allowance_of(c.steth, user, c.wsteth), TokenAmount::ZERO);
    }

    #[tokio::test]
    async fn test_fault_injection() {
        let (chain, c, user) = chain();
        let approve = WriteCall::Approve { token: c.steth, spender: c.wsteth, amount: U256::from(1u8) };

        chain.reject_next_signature();
        assert_eq!(chain.send(user, approve.clone()).await.unwrap_err(), ChainError::SignatureRejected);

        chain.revert_next_transaction();
        let err = confirm(&chain, user, approve.clone()).await.unwrap_err();
        assert!(matches!(err, ChainError::TransactionReverted { .. }));
        assert_eq!(chain.allowance_of(c.steth, user, c.wsteth), TokenAmount::ZERO);

        chain.set_offline(true);
        let err = chain.read(ReadCall::NativeBalance { owner: user }).await.unwrap_err();
        assert!(matches!(err, ChainError::NetworkUnavailable { .. }));
        chain.set_offline(false);
        assert!(confirm(&chain, user, approve).await.is_ok());
    }

    #[tokio::test]
    async fn test_held_confirmations_wait_for_release() {
        let (chain, c, user) = chain();
        let chain = std::sync::Arc::new(chain);
        chain.hold_confirmations();
        let tx = chain
            .send(user, WriteCall::Approve { token: c.steth, spender: c.wsteth, amount: U256::from(5u8) })
            .await
            .unwrap();

        let waiter = {
            let chain = chain.clone();
            tokio::spawn(async move { chain.wait_for_receipt(&tx).await })
        };
        tokio::task::yield_now().await;
        assert_eq!(chain.pending_count(), 1);

        chain.release_confirmations();
        let receipt = waiter.await.unwrap().unwrap();
        assert_eq!(receipt.to, c.steth);
        assert_eq!(chain.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_transaction() {
        let (chain, _, _) = chain();
        let err = chain
            .wait_for_receipt(&TxHandle { hash: B256::repeat_byte(9) })
            .await
            .unwrap_err();
        assert!(matches!(err, ChainError::UnknownTransaction { .. }));
    }
}
