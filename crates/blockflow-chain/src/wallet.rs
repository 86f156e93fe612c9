//! Wallet session and demo signer identity.
//!
//! The real wallet (browser extension, WalletConnect, hardware) is an opaque
//! capability outside BlockFlow. What the blocks need from it is whether a
//! wallet is connected and which address signs; `WalletSession` holds exactly
//! that.
//!
//! `DemoSigner` derives a stable secp256k1 identity from a label so the demo
//! and the TUI always connect the same Ethereum address:
//! - `secp256k1` keypair → address (keccak256 of the uncompressed pubkey tail)

use alloy_primitives::Address;
use blockflow_types::short_address;
use k256::ecdsa::SigningKey;
use k256::elliptic_curve::sec1::ToEncodedPoint as _;
use parking_lot::RwLock;
use sha3::{Digest, Keccak256};
use thiserror::Error;

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum SignerError {
    #[error("seed does not yield a valid secp256k1 key")]
    InvalidSeed,
}

// ── Demo signer ───────────────────────────────────────────────────────────────

/// Deterministic demo identity.
///
/// The signing key is never exported; only the derived address is.
pub struct DemoSigner {
    signing_key: SigningKey,
    address: Address,
    /// Human-readable label
    pub label: String,
}

impl DemoSigner {
    /// Create a signer from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32], label: impl Into<String>) -> Result<Self, SignerError> {
        let signing_key =
            SigningKey::from_bytes(seed.into()).map_err(|_| SignerError::InvalidSeed)?;
        let address = address_of(&signing_key);
        Ok(Self {
            signing_key,
            address,
            label: label.into(),
        })
    }

    /// Create a signer from a label (deterministic demo identity).
    pub fn for_label(label: &str) -> Result<Self, SignerError> {
        let seed = blake3::derive_key("blockflow demo wallet seed v1", label.as_bytes());
        Self::from_seed(&seed, label)
    }

    /// Ethereum address of this signer
    pub fn address(&self) -> Address {
        self.address
    }

    /// Compressed public key bytes (33 bytes)
    pub fn public_key_compressed(&self) -> Vec<u8> {
        self.signing_key
            .verifying_key()
            .to_encoded_point(true)
            .as_bytes()
            .to_vec()
    }
}

impl std::fmt::Debug for DemoSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DemoSigner")
            .field("label", &self.label)
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Derive from the secp256k1 uncompressed public key (sans prefix byte).
fn address_of(signing_key: &SigningKey) -> Address {
    let encoded = signing_key.verifying_key().to_encoded_point(false);
    // bytes[0] == 0x04 (prefix), skip it
    let hash = Keccak256::digest(&encoded.as_bytes()[1..]);
    Address::from_slice(&hash[12..]) // last 20 bytes
}

// ── Session ───────────────────────────────────────────────────────────────────

/// Connected-wallet state shared by the surface and every block
#[derive(Debug, Default)]
pub struct WalletSession {
    address: RwLock<Option<Address>>,
}

impl WalletSession {
    /// A disconnected session
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect an address, replacing any previous one
    pub fn connect(&self, address: Address) {
        *self.address.write() = Some(address);
        tracing::info!(%address, "wallet connected");
    }

    /// Disconnect
    pub fn disconnect(&self) {
        if self.address.write().take().is_some() {
            tracing::info!("wallet disconnected");
        }
    }

    /// Current signing address, if connected
    pub fn address(&self) -> Option<Address> {
        *self.address.read()
    }

    pub fn is_connected(&self) -> bool {
        self.address.read().is_some()
    }

    /// Banner shown above the canvas
    pub fn banner(&self) -> String {
        match self.address() {
            Some(address) => format!("Connected: {}", short_address(&address)),
            None => "Connect Wallet".to_string(),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_signer_stable_across_calls() {
        let a = DemoSigner::for_label("alice").unwrap();
        let b = DemoSigner::for_label("alice").unwrap();
        assert_eq!(a.address(), b.address(), "Same label → same address");
    }

    #[test]
    fn different_labels_have_different_addresses() {
        let alice = DemoSigner::for_label("alice").unwrap();
        let bob = DemoSigner::for_label("bob").unwrap();
        assert_ne!(alice.address(), bob.address());
    }

    #[test]
    fn compressed_pubkey_is_33_bytes() {
        let signer = DemoSigner::for_label("carol").unwrap();
        assert_eq!(signer.public_key_compressed().len(), 33);
    }

    #[test]
    fn zero_seed_is_rejected() {
        assert!(DemoSigner::from_seed(&[0u8; 32], "zero").is_err());
    }

    #[test]
    fn session_connect_disconnect() {
        let session = WalletSession::new();
        assert!(!session.is_connected());
        assert_eq!(session.banner(), "Connect Wallet");

        let signer = DemoSigner::for_label("alice").unwrap();
        session.connect(signer.address());
        assert_eq!(session.address(), Some(signer.address()));
        assert!(session.banner().starts_with("Connected: 0x"));
        assert!(session.banner().contains("..."));

        session.disconnect();
        assert!(session.address().is_none());
    }
}
