//! BlockFlow Chain - the boundary between blocks and the chain
//!
//! This crate implements:
//! - The `ChainClient` trait every node/wallet integration plugs into
//! - `ContractAdapter`, typed calls against the lending pool and the
//!   staking/wrap token pair
//! - Per-network contract addresses
//! - The wallet session (connected address) and a deterministic demo signer
//! - `SimulatedChain`, an in-memory chain used by the demo, the TUI and tests

pub mod client;
pub mod contracts;
pub mod adapter;
pub mod wallet;
pub mod simulated;

pub use client::*;
pub use contracts::*;
pub use adapter::*;
pub use wallet::*;
pub use simulated::*;
