//! Subcommands

pub mod demo;
pub mod inspect;
pub mod tui;

use blockflow_chain::SimulatedChain;
use blockflow_types::{Address, TokenAmount};

/// ETH the demo wallet starts with
pub const DEMO_ETH: u64 = 5;
/// wstETH the demo wallet starts with
pub const DEMO_WSTETH: u64 = 2;

/// Give `owner` the demo balances on a fresh simulated chain
pub fn seed_demo_wallet(chain: &SimulatedChain, owner: Address) {
    let supply_asset = chain.contracts().supply_asset;
    chain.fund_native(owner, TokenAmount::from_tokens(DEMO_ETH));
    chain.mint(supply_asset, owner, TokenAmount::from_tokens(DEMO_WSTETH));
    tracing::debug!(%owner, eth = DEMO_ETH, wsteth = DEMO_WSTETH, "seeded demo wallet");
}
