//! Network-specific contract addresses

use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("unknown network '{0}' (supported: sepolia)")]
pub struct UnknownNetwork(pub String);

/// Fixed contract addresses of one deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkContracts {
    pub chain_id: u64,
    /// Lending pool
    pub pool: Address,
    /// Asset supplied to the pool (wstETH listed on the lending market)
    pub supply_asset: Address,
    /// Liquid staking token, also the staking entry point
    pub steth: Address,
    /// Wrapped staking token, also the wrap spender
    pub wsteth: Address,
}

impl NetworkContracts {
    /// Sepolia testnet deployment
    pub fn sepolia() -> Self {
        Self {
            chain_id: 11155111,
            pool: address!("6ae43d3271ff6888e7fc43fd7321a503ff738951"),
            supply_asset: address!("8d09a4502cc8cf1547ad300e066060d043f6982d"),
            steth: address!("1643e812ae58766192cf7d2cf9567df2c37e9b7f"),
            wsteth: address!("0b11d1569d505eb8547484599d802c5e05cd4aac"),
        }
    }

    /// Resolve a network by name
    pub fn for_network(name: &str) -> Result<Self, UnknownNetwork> {
        match name.trim().to_lowercase().as_str() {
            "sepolia" => Ok(Self::sepolia()),
            other => Err(UnknownNetwork(other.to_string())),
        }
    }
}

impl Default for NetworkContracts {
    fn default() -> Self {
        Self::sepolia()
    }
}
