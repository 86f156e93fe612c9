//! Error types shared across BlockFlow crates
//!
//! Every chain failure is scoped to the block that raised it. Nothing here is
//! fatal to the application and nothing is retried automatically.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from parsing a user-entered amount
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    /// Nothing entered
    #[error("amount is empty")]
    Empty,

    /// Leading minus sign
    #[error("amount cannot be negative: '{0}'")]
    Negative(String),

    /// Anything other than digits and a single decimal point
    #[error("invalid amount: '{0}'")]
    InvalidDigits(String),

    /// More than 18 fractional digits
    #[error("too many decimal places in '{0}' (max 18)")]
    TooManyDecimals(String),

    /// Does not fit in 256 bits
    #[error("amount overflow")]
    Overflow,
}

/// Result type for chain boundary calls
pub type ChainResult<T> = std::result::Result<T, ChainError>;

/// Errors reported by the chain client
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// A view call failed or returned something unusable
    #[error("read failed: {reason}")]
    ReadFailure { reason: String },

    /// The user declined to sign in the wallet
    #[error("signature rejected by wallet")]
    SignatureRejected,

    /// The chain rejected the transaction
    #[error("transaction reverted: {reason}")]
    TransactionReverted { reason: String },

    /// The client cannot reach the chain
    #[error("network unavailable: {message}")]
    NetworkUnavailable { message: String },

    /// A receipt was requested for a hash the client never issued
    #[error("unknown transaction {tx_hash}")]
    UnknownTransaction { tx_hash: String },
}

/// Whether a failing operation was a view call or a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChainOp {
    Read,
    Write,
}

/// How a failure is presented and recovered from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    ReadFailure,
    SignatureRejected,
    TransactionReverted,
}

impl ChainError {
    /// Create a read failure
    pub fn read(reason: impl Into<String>) -> Self {
        Self::ReadFailure {
            reason: reason.into(),
        }
    }

    /// Create a revert
    pub fn reverted(reason: impl Into<String>) -> Self {
        Self::TransactionReverted {
            reason: reason.into(),
        }
    }

    /// Create a network failure
    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkUnavailable {
            message: message.into(),
        }
    }

    /// Classify the error for the operation that raised it.
    ///
    /// A network outage counts as a read failure for reads and as a revert
    /// for writes.
    pub fn failure_kind(&self, op: ChainOp) -> FailureKind {
        match (self, op) {
            (Self::SignatureRejected, _) => FailureKind::SignatureRejected,
            (Self::TransactionReverted { .. }, _) => FailureKind::TransactionReverted,
            (Self::ReadFailure { .. }, ChainOp::Read) => FailureKind::ReadFailure,
            (Self::NetworkUnavailable { .. }, ChainOp::Read) => FailureKind::ReadFailure,
            (Self::UnknownTransaction { .. }, ChainOp::Read) => FailureKind::ReadFailure,
            (_, ChainOp::Write) => FailureKind::TransactionReverted,
        }
    }

    /// Get an error code for logs and event payloads
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ReadFailure { .. } => "READ_FAILURE",
            Self::SignatureRejected => "SIGNATURE_REJECTED",
            Self::TransactionReverted { .. } => "TRANSACTION_REVERTED",
            Self::NetworkUnavailable { .. } => "NETWORK_UNAVAILABLE",
            Self::UnknownTransaction { .. } => "UNKNOWN_TRANSACTION",
        }
    }
}
