//! Flow errors

use blockflow_types::{AmountError, BlockId, ChainError};
use thiserror::Error;

use crate::workflow::IllegalTransition;

/// Result type for flow operations
pub type FlowResult<T> = std::result::Result<T, FlowError>;

/// Errors raised by the surface, the canvas and block workflows
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FlowError {
    #[error(transparent)]
    IllegalTransition(#[from] IllegalTransition),

    /// A workflow is in flight; edits and new actions wait for it
    #[error("block {0} is busy")]
    Busy(BlockId),

    /// The primary button is disabled with this label
    #[error("action unavailable: {0}")]
    ActionUnavailable(String),

    #[error("wallet not connected")]
    WalletDisconnected,

    #[error(transparent)]
    Amount(#[from] AmountError),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error("no drag in progress")]
    NoDrag,

    #[error("configuration error: {0}")]
    Config(String),
}

impl FlowError {
    /// Get an error code for logs and event payloads
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::IllegalTransition(_) => "ILLEGAL_TRANSITION",
            Self::Busy(_) => "BLOCK_BUSY",
            Self::ActionUnavailable(_) => "ACTION_UNAVAILABLE",
            Self::WalletDisconnected => "WALLET_DISCONNECTED",
            Self::Amount(_) => "INVALID_AMOUNT",
            Self::Chain(e) => e.error_code(),
            Self::NoDrag => "NO_DRAG",
            Self::Config(_) => "CONFIG_ERROR",
        }
    }
}
