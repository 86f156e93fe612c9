//! Per-block transaction workflow
//!
//! Every block owns one `WorkflowState`. All changes go through
//! [`WorkflowState::apply`], a pure function of the current state and a
//! `WorkflowEvent`, so a second primary action while a transaction is in
//! flight is rejected instead of racing the first.
//!
//! ```text
//!            edit (non-empty)          evaluated
//!   Idle ───────────────────→ Checking ─────────→ NeedsApproval ──approve──→ Approving
//!    ↑                           ↑   └──────────→ Ready ──submit──→ Submitting ──┐
//!    │                           └──── approval confirmed ─────────────┘        │
//!    └────────────────────────── final confirmation ───────────────────────────┘
//! ```

use std::fmt;

use blockflow_types::{BlockKind, TokenAmount};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Transaction currently being submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitStep {
    /// Lending pool supply
    Supply,
    /// ETH → stETH
    Stake,
    /// stETH allowance for the wrapper
    ApproveWrap,
    /// stETH → wstETH
    Wrap,
}

impl SubmitStep {
    /// Button label while the step is pending
    pub fn pending_label(&self) -> &'static str {
        match self {
            Self::Supply => "Supplying...",
            Self::Stake => "Staking...",
            Self::ApproveWrap => "Approving wrap...",
            Self::Wrap => "Wrapping...",
        }
    }
}

/// Workflow state of one block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum WorkflowState {
    /// Amount empty, nothing pending
    #[default]
    Idle,
    /// Allowance and balances are being read for the entered amount
    Checking,
    /// The amount exceeds the allowance (supply only)
    NeedsApproval,
    /// Approval submitted; `then_submit` continues into the supply
    Approving { then_submit: bool },
    /// Allowance sufficient or not applicable
    Ready,
    /// Main transaction, or a step of the stake chain, submitted
    Submitting { step: SubmitStep },
}

/// Inputs to the workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowEvent {
    /// The amount field changed
    AmountEdited { empty: bool },
    /// A read of allowance/balances finished
    Evaluated { needs_approval: bool },
    /// The user asked for an approval only
    ApproveRequested,
    /// The user asked for the main action; approval first if needed
    SubmitRequested { step: SubmitStep, needs_approval: bool },
    ApprovalConfirmed,
    ApprovalFailed,
    /// The next step of a multi-transaction chain was submitted
    StepStarted(SubmitStep),
    /// The final transaction confirmed
    Confirmed,
    SubmitFailed,
}

/// An event that has no meaning in the current state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal transition: {event:?} in state {from}")]
pub struct IllegalTransition {
    pub from: WorkflowState,
    pub event: WorkflowEvent,
}

impl WorkflowState {
    /// Compute the next state.
    ///
    /// Evaluations that land while a transaction is in flight are ignored.
    pub fn apply(self, event: WorkflowEvent) -> Result<WorkflowState, IllegalTransition> {
        use WorkflowEvent as E;
        use WorkflowState as S;

        let illegal = IllegalTransition { from: self, event };
        let next = match (self, event) {
            (S::Approving { .. } | S::Submitting { .. }, E::AmountEdited { .. }) => return Err(illegal),
            (_, E::AmountEdited { empty: true }) => S::Idle,
            (_, E::AmountEdited { empty: false }) => S::Checking,

            (S::Approving { .. } | S::Submitting { .. } | S::Idle, E::Evaluated { .. }) => self,
            (_, E::Evaluated { needs_approval: true }) => S::NeedsApproval,
            (_, E::Evaluated { needs_approval: false }) => S::Ready,

            (S::Checking | S::NeedsApproval, E::ApproveRequested) => S::Approving { then_submit: false },

            (S::Checking | S::NeedsApproval | S::Ready, E::SubmitRequested { step, needs_approval }) => {
                if needs_approval {
                    S::Approving { then_submit: true }
                } else {
                    S::Submitting { step }
                }
            }

            (S::Approving { then_submit: true }, E::ApprovalConfirmed) => S::Submitting {
                step: SubmitStep::Supply,
            },
            (S::Approving { then_submit: false }, E::ApprovalConfirmed) => S::Checking,
            (S::Approving { .. }, E::ApprovalFailed) => S::NeedsApproval,

            (S::Submitting { .. }, E::StepStarted(step)) => S::Submitting { step },
            (S::Submitting { .. }, E::Confirmed) => S::Idle,
            (S::Submitting { .. }, E::SubmitFailed) => S::Ready,

            _ => return Err(illegal),
        };
        Ok(next)
    }

    /// A transaction is in flight
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Approving { .. } | Self::Submitting { .. })
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Checking => f.write_str("checking"),
            Self::NeedsApproval => f.write_str("needs-approval"),
            Self::Approving { then_submit: true } => f.write_str("approving (then supply)"),
            Self::Approving { then_submit: false } => f.write_str("approving"),
            Self::Ready => f.write_str("ready"),
            Self::Submitting { step } => write!(f, "submitting {:?}", step),
        }
    }
}

// ============================================================================
// Primary button
// ============================================================================

/// What pressing the primary button does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonAction {
    Approve,
    Submit,
}

/// Label and enabled state of a block's primary button
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonConfig {
    pub label: String,
    pub enabled: bool,
    pub action: Option<ButtonAction>,
}

impl ButtonConfig {
    fn disabled(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            enabled: false,
            action: None,
        }
    }

    fn enabled(label: impl Into<String>, action: ButtonAction) -> Self {
        Self {
            label: label.into(),
            enabled: true,
            action: Some(action),
        }
    }

    /// Derive the button from a block's current inputs.
    ///
    /// Rules apply in order; the first match wins. A balance or allowance
    /// that has not been read yet counts as zero.
    pub fn derive(input: &ButtonInput<'_>) -> Self {
        if !input.connected {
            return Self::disabled("Connect Wallet");
        }
        match input.state {
            WorkflowState::Approving { .. } => return Self::disabled("Approving..."),
            WorkflowState::Submitting { step } => return Self::disabled(step.pending_label()),
            _ => {}
        }

        if input.amount.trim().is_empty() {
            return Self::disabled("Enter Amount");
        }
        let amount = match TokenAmount::from_decimal_str(input.amount) {
            Ok(amount) if amount.is_zero() => return Self::disabled("Enter Amount"),
            Ok(amount) => amount,
            Err(_) => return Self::disabled("Invalid Amount"),
        };

        let balance = input.balance.unwrap_or(TokenAmount::ZERO);
        if amount > balance {
            return Self::disabled(match input.kind {
                BlockKind::AaveSupply => "Insufficient wstETH",
                BlockKind::LidoStake => "Insufficient ETH",
            });
        }

        match input.kind {
            BlockKind::AaveSupply => {
                let allowance = input.allowance.unwrap_or(TokenAmount::ZERO);
                if amount > allowance {
                    Self::enabled("Approve", ButtonAction::Approve)
                } else {
                    Self::enabled("Supply", ButtonAction::Submit)
                }
            }
            BlockKind::LidoStake if input.wrap => Self::enabled("Stake & Wrap", ButtonAction::Submit),
            BlockKind::LidoStake => Self::enabled("Stake", ButtonAction::Submit),
        }
    }
}

/// Everything the primary button depends on
#[derive(Debug, Clone, Copy)]
pub struct ButtonInput<'a> {
    pub kind: BlockKind,
    pub connected: bool,
    pub state: WorkflowState,
    pub amount: &'a str,
    /// Spendable balance: wstETH for supply, ETH for stake
    pub balance: Option<TokenAmount>,
    /// Allowance toward the pool (supply only)
    pub allowance: Option<TokenAmount>,
    pub wrap: bool,
}
