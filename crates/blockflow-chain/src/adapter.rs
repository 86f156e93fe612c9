//! Contract adapter: typed request/response over an injected chain client.
//!
//! The adapter holds no state besides the client. It never interprets or
//! recovers from errors; callers decide what a `ChainError` means for them.

use std::sync::Arc;

use alloy_primitives::{Address, U256};
use blockflow_types::{ray_to_percent, ChainResult, TokenAmount};

use crate::client::*;

/// Asset whose balance is being read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// The chain's native asset (ETH)
    Native,
    /// An ERC-20 contract
    Erc20(Address),
}

/// Typed calls against the lending pool and the staking/wrap pair
#[derive(Clone)]
pub struct ContractAdapter {
    client: Arc<dyn ChainClient>,
}

impl ContractAdapter {
    /// Wrap a chain client
    pub fn new(client: Arc<dyn ChainClient>) -> Self {
        Self { client }
    }

    /// Underlying client name
    pub fn client_name(&self) -> &'static str {
        self.client.name()
    }

    // ── Reads ────────────────────────────────────────────────────────────────

    /// Balance of `token` held by `address`
    pub async fn get_balance(&self, token: Token, address: Address) -> ChainResult<TokenAmount> {
        let call = match token {
            Token::Native => ReadCall::NativeBalance { owner: address },
            Token::Erc20(token) => ReadCall::BalanceOf {
                token,
                owner: address,
            },
        };
        self.client.read(call).await.map(TokenAmount::from_wei)
    }

    /// Native ETH balance
    pub async fn get_native_balance(&self, address: Address) -> ChainResult<TokenAmount> {
        self.get_balance(Token::Native, address).await
    }

    /// How much `spender` may pull from `owner`
    pub async fn get_allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> ChainResult<TokenAmount> {
        self.client
            .read(ReadCall::Allowance {
                token,
                owner,
                spender,
            })
            .await
            .map(TokenAmount::from_wei)
    }

    /// stETH per wrapped token, 18 decimals
    pub async fn steth_per_token(&self, wrapper: Address) -> ChainResult<TokenAmount> {
        self.client
            .read(ReadCall::StEthPerToken { wrapper })
            .await
            .map(TokenAmount::from_wei)
    }

    /// Supply APY of `asset` in percent, from the reserve liquidity rate
    pub async fn supply_apy(&self, pool: Address, asset: Address) -> ChainResult<f64> {
        let rate: U256 = self
            .client
            .read(ReadCall::ReserveLiquidityRate { pool, asset })
            .await?;
        Ok(ray_to_percent(rate))
    }

    /// Lending pool account summary
    pub async fn user_account_data(&self, pool: Address, user: Address) -> ChainResult<UserAccountData> {
        self.client.read_account(pool, user).await
    }

    // ── Writes ───────────────────────────────────────────────────────────────

    /// Approve `spender` to pull `amount` of `token` from `from`
    pub async fn approve(
        &self,
        from: Address,
        token: Address,
        spender: Address,
        amount: TokenAmount,
    ) -> ChainResult<TxHandle> {
        self.submit(
            from,
            WriteCall::Approve {
                token,
                spender,
                amount: amount.wei(),
            },
        )
        .await
    }

    /// Supply `amount` of `token` into `pool`, crediting `on_behalf_of`
    pub async fn supply(
        &self,
        from: Address,
        pool: Address,
        token: Address,
        amount: TokenAmount,
        on_behalf_of: Address,
    ) -> ChainResult<TxHandle> {
        self.submit(
            from,
            WriteCall::Supply {
                pool,
                asset: token,
                amount: amount.wei(),
                on_behalf_of,
                referral_code: 0,
            },
        )
        .await
    }

    /// Stake `amount` ETH; the sender is its own referral
    pub async fn stake(
        &self,
        from: Address,
        staking_contract: Address,
        amount: TokenAmount,
    ) -> ChainResult<TxHandle> {
        self.submit(
            from,
            WriteCall::Submit {
                steth: staking_contract,
                value: amount.wei(),
                referral: from,
            },
        )
        .await
    }

    /// Wrap `amount` stETH into the wrapper
    pub async fn wrap(
        &self,
        from: Address,
        wrapper: Address,
        amount: TokenAmount,
    ) -> ChainResult<TxHandle> {
        self.submit(
            from,
            WriteCall::Wrap {
                wrapper,
                amount: amount.wei(),
            },
        )
        .await
    }

    /// Wait for the transaction to be mined
    pub async fn wait_for_confirmation(&self, tx: &TxHandle) -> ChainResult<TxReceipt> {
        let receipt = self.client.wait_for_receipt(tx).await?;
        tracing::debug!(tx = %tx, block = receipt.block_number, "transaction confirmed");
        Ok(receipt)
    }

    async fn submit(&self, from: Address, call: WriteCall) -> ChainResult<TxHandle> {
        let method = call.method();
        let target = call.target();
        let tx = self.client.send(from, call).await?;
        tracing::debug!(%from, %target, method, tx = %tx, "transaction submitted");
        Ok(tx)
    }
}

impl std::fmt::Debug for ContractAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractAdapter")
            .field("client", &self.client.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NetworkContracts, SimulatedChain};

    fn setup() -> (Arc<SimulatedChain>, ContractAdapter, NetworkContracts, Address) {
        let contracts = NetworkContracts::sepolia();
        let chain = Arc::new(SimulatedChain::new(contracts));
        let adapter = ContractAdapter::new(chain.clone());
        let user = Address::repeat_byte(0x11);
        (chain, adapter, contracts, user)
    }

    #[tokio::test]
    async fn test_reads_go_through_client() {
        let (chain, adapter, c, user) = setup();
        chain.fund_native(user, TokenAmount::from_tokens(2));
        chain.mint(c.supply_asset, user, TokenAmount::from_tokens(5));

        assert_eq!(adapter.get_native_balance(user).await.unwrap(), TokenAmount::from_tokens(2));
        assert_eq!(
            adapter.get_balance(Token::Erc20(c.supply_asset), user).await.unwrap(),
            TokenAmount::from_tokens(5)
        );
        assert_eq!(
            adapter.get_allowance(c.supply_asset, user, c.pool).await.unwrap(),
            TokenAmount::ZERO
        );
    }

    #[tokio::test]
    async fn test_approve_then_supply() {
        let (chain, adapter, c, user) = setup();
        chain.mint(c.supply_asset, user, TokenAmount::from_tokens(5));
        let amount = TokenAmount::from_tokens(3);

        let tx = adapter.approve(user, c.supply_asset, c.pool, amount).await.unwrap();
        adapter.wait_for_confirmation(&tx).await.unwrap();
        assert_eq!(adapter.get_allowance(c.supply_asset, user, c.pool).await.unwrap(), amount);

        let tx = adapter.supply(user, c.pool, c.supply_asset, amount, user).await.unwrap();
        let receipt = adapter.wait_for_confirmation(&tx).await.unwrap();
        assert_eq!(receipt.to, c.pool);
        assert_eq!(
            adapter.get_balance(Token::Erc20(c.supply_asset), user).await.unwrap(),
            TokenAmount::from_tokens(2)
        );

        let account = adapter.user_account_data(c.pool, user).await.unwrap();
        assert_eq!(account.total_collateral_base, amount.wei());
    }

    #[tokio::test]
    async fn test_stake_uses_sender_as_referral() {
        let (chain, adapter, c, user) = setup();
        chain.fund_native(user, TokenAmount::from_tokens(1));
        adapter.stake(user, c.steth, TokenAmount::from_tokens(1)).await.unwrap();
        let sent = chain.submitted_calls();
        assert!(matches!(sent[0].1, WriteCall::Submit { referral, .. } if referral == user));
    }
}
