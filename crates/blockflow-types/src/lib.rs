//! BlockFlow Types - Canonical domain types for the DeFi block canvas
//!
//! This crate contains the foundational types for BlockFlow with zero
//! dependencies on other blockflow crates:
//!
//! - Canvas geometry (`Position`, grid unit)
//! - Block instances and the closed block catalog
//! - Session-unique block identifiers
//! - 18-decimal token amounts over `U256`
//! - Chain boundary errors and their failure classification
//!
//! # Flow
//!
//! ```text
//! Palette → Surface (authoritative block list) → Canvas → Block → Contract Adapter
//! ```

pub mod identity;
pub mod canvas;
pub mod amount;
pub mod error;

pub use identity::*;
pub use canvas::*;
pub use amount::*;
pub use error::*;

pub use alloy_primitives::{address, Address, U256};

/// Format an address the way the wallet banner shows it: `0x1234...abcd`.
pub fn short_address(address: &Address) -> String {
    let full = address.to_string();
    if full.len() <= 10 {
        return full;
    }
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}
