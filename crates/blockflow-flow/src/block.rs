//! Mounted blocks
//!
//! A `BlockController` is one placed block brought to life: it owns the
//! amount field, the wrap toggle, the panel data read from the chain and the
//! workflow state, and it runs the block's transactions through the
//! `ContractAdapter`.
//!
//! # Concurrency
//!
//! Block state sits behind a `tokio::sync::RwLock` that is never held across
//! a chain call. Every chain await is followed by a detach check: once the
//! block is unmounted, in-flight transactions still resolve on chain but the
//! block neither records their results nor starts further steps.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use blockflow_chain::{
    ContractAdapter, NetworkContracts, Token, TxHandle, TxReceipt, UserAccountData, WalletSession,
};
use blockflow_types::{
    Address, BlockId, BlockInstance, BlockKind, ChainError, ChainOp, ChainResult, FailureKind,
    TokenAmount,
};
use chrono::Utc;
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::error::{FlowError, FlowResult};
use crate::events::{EventBus, FlowEvent, NotificationLevel};
use crate::workflow::*;

/// Shared collaborators every block is mounted with
#[derive(Debug, Clone)]
pub struct BlockContext {
    pub adapter: ContractAdapter,
    pub contracts: NetworkContracts,
    pub wallet: Arc<WalletSession>,
    pub events: EventBus,
    pub poll_interval: Duration,
    /// Staking APR shown on stake blocks, percent
    pub stake_apr: f64,
}

// ============================================================================
// Panel data
// ============================================================================

/// Data shown by a supply block
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SupplyPanel {
    /// wstETH balance
    pub balance: Option<TokenAmount>,
    /// wstETH allowance toward the pool
    pub allowance: Option<TokenAmount>,
    /// Supply APY, percent
    pub apy: Option<f64>,
    /// Pool account summary
    pub account: Option<UserAccountData>,
}

/// Data shown by a stake block
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StakePanel {
    pub eth_balance: Option<TokenAmount>,
    pub steth_balance: Option<TokenAmount>,
    pub wsteth_balance: Option<TokenAmount>,
    /// stETH per wstETH
    pub steth_per_token: Option<TokenAmount>,
    /// Staking APR, percent
    pub apr: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "panel", rename_all = "snake_case")]
pub enum PanelData {
    Supply(SupplyPanel),
    Stake(StakePanel),
}

impl PanelData {
    fn empty(kind: BlockKind, stake_apr: f64) -> Self {
        match kind {
            BlockKind::AaveSupply => Self::Supply(SupplyPanel::default()),
            BlockKind::LidoStake => Self::Stake(StakePanel {
                apr: stake_apr,
                ..StakePanel::default()
            }),
        }
    }

    /// Balance the amount is spent from: wstETH for supply, ETH for stake
    pub fn spendable_balance(&self) -> Option<TokenAmount> {
        match self {
            Self::Supply(p) => p.balance,
            Self::Stake(p) => p.eth_balance,
        }
    }

    /// Allowance toward the pool; stake blocks have none
    pub fn allowance(&self) -> Option<TokenAmount> {
        match self {
            Self::Supply(p) => p.allowance,
            Self::Stake(_) => None,
        }
    }
}

/// Render-ready copy of a block
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockView {
    pub id: BlockId,
    pub kind: BlockKind,
    pub title: &'static str,
    pub workflow: WorkflowState,
    pub amount: String,
    pub wrap: bool,
    pub panel: PanelData,
    pub button: ButtonConfig,
    /// wstETH received for the amount when wrapping
    pub estimated_wsteth: Option<TokenAmount>,
    pub notes: Vec<&'static str>,
    pub refresh_count: u64,
}

/// How a workflow ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowOutcome {
    /// Approval confirmed, main action still to do
    Approved,
    /// Final transaction confirmed
    Confirmed,
    /// The block was removed before the workflow finished
    Discarded,
}

#[derive(Debug)]
struct BlockState {
    workflow: WorkflowState,
    amount: String,
    wrap: bool,
    panel: PanelData,
    /// Generation of the load `panel` came from
    panel_generation: u64,
}

// ============================================================================
// Controller
// ============================================================================

struct BlockInner {
    id: BlockId,
    kind: BlockKind,
    ctx: BlockContext,
    state: RwLock<BlockState>,
    detached: AtomicBool,
    refreshes: AtomicU64,
    /// Bumped when a load starts; a load older than the displayed panel is dropped
    generation: AtomicU64,
}

/// A mounted block
pub struct BlockController {
    inner: Arc<BlockInner>,
    poller: Mutex<Option<JoinHandle<()>>>,
}

impl BlockController {
    /// Mount `instance`: load its data once, then poll every
    /// `ctx.poll_interval` until unmounted.
    pub async fn mount(instance: BlockInstance, ctx: BlockContext) -> Self {
        let inner = Arc::new(BlockInner {
            id: instance.id,
            kind: instance.kind,
            state: RwLock::new(BlockState {
                workflow: WorkflowState::Idle,
                amount: String::new(),
                wrap: false,
                panel: PanelData::empty(instance.kind, ctx.stake_apr),
                panel_generation: 0,
            }),
            ctx,
            detached: AtomicBool::new(false),
            refreshes: AtomicU64::new(0),
            generation: AtomicU64::new(0),
        });
        tracing::info!(block = %inner.id, kind = inner.kind.id(), "block mounted");

        let _ = inner.refresh().await;
        let poller = spawn_poller(inner.clone());
        Self {
            inner,
            poller: Mutex::new(Some(poller)),
        }
    }

    pub fn id(&self) -> BlockId {
        self.inner.id
    }

    pub fn kind(&self) -> BlockKind {
        self.inner.kind
    }

    /// Stop polling and detach in-flight workflows. Idempotent.
    pub fn unmount(&self) {
        if self.inner.detached.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(poller) = self.poller.lock().take() {
            poller.abort();
        }
        tracing::info!(block = %self.inner.id, "block unmounted");
    }

    pub fn is_mounted(&self) -> bool {
        !self.inner.is_detached()
    }

    /// True while the poll task is alive
    pub fn is_polling(&self) -> bool {
        self.poller
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Number of successful data loads, including the one at mount
    pub fn refresh_count(&self) -> u64 {
        self.inner.refreshes.load(Ordering::SeqCst)
    }

    pub async fn workflow(&self) -> WorkflowState {
        self.inner.state.read().await.workflow
    }

    pub async fn amount(&self) -> String {
        self.inner.state.read().await.amount.clone()
    }

    /// Snapshot for rendering
    pub async fn view(&self) -> BlockView {
        self.inner.view().await
    }

    pub async fn button(&self) -> ButtonConfig {
        self.inner.view().await.button
    }

    /// Re-read balances, allowance and rates
    pub async fn refresh(&self) -> FlowResult<()> {
        self.inner.refresh().await
    }

    /// Replace the amount field. Rejected while a transaction is in flight.
    pub async fn set_amount(&self, text: impl Into<String>) -> FlowResult<()> {
        self.inner.set_amount(text.into()).await
    }

    /// Fill the amount with the full spendable balance
    pub async fn set_max(&self) -> FlowResult<()> {
        let balance = self.inner.state.read().await.panel.spendable_balance();
        match balance {
            Some(balance) => self.inner.set_amount(balance.to_plain_string()).await,
            None => Ok(()),
        }
    }

    /// Toggle wrapping after staking (stake blocks only)
    pub async fn set_wrap(&self, wrap: bool) -> FlowResult<()> {
        if self.inner.kind != BlockKind::LidoStake {
            return Err(FlowError::ActionUnavailable("Wrap".to_string()));
        }
        let mut state = self.inner.state.write().await;
        if state.workflow.is_busy() {
            return Err(FlowError::Busy(self.inner.id));
        }
        state.wrap = wrap;
        Ok(())
    }

    /// Press the primary button
    pub async fn primary_action(&self) -> FlowResult<WorkflowOutcome> {
        let button = self.button().await;
        match button.action {
            Some(ButtonAction::Approve) if button.enabled => self.inner.approve().await,
            Some(ButtonAction::Submit) if button.enabled => self.inner.submit().await,
            _ => Err(FlowError::ActionUnavailable(button.label)),
        }
    }

    /// Approve the pool for the entered amount (supply blocks only)
    pub async fn approve(&self) -> FlowResult<WorkflowOutcome> {
        self.inner.approve().await
    }

    /// Run the main action, approving first when the allowance is short
    pub async fn submit(&self) -> FlowResult<WorkflowOutcome> {
        self.inner.submit().await
    }
}

impl Drop for BlockController {
    fn drop(&mut self) {
        self.inner.detached.store(true, Ordering::SeqCst);
        if let Some(poller) = self.poller.get_mut().take() {
            poller.abort();
        }
    }
}

impl std::fmt::Debug for BlockController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockController")
            .field("id", &self.inner.id)
            .field("kind", &self.inner.kind)
            .field("mounted", &self.is_mounted())
            .finish()
    }
}

fn spawn_poller(inner: Arc<BlockInner>) -> JoinHandle<()> {
    let period = inner.ctx.poll_interval.max(Duration::from_millis(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if inner.is_detached() {
                break;
            }
            tracing::debug!(block = %inner.id, "polling block data");
            let _ = inner.refresh().await;
        }
    })
}

impl BlockInner {
    fn is_detached(&self) -> bool {
        self.detached.load(Ordering::SeqCst)
    }

    fn signer(&self) -> FlowResult<Address> {
        self.ctx.wallet.address().ok_or(FlowError::WalletDisconnected)
    }

    async fn view(&self) -> BlockView {
        let state = self.state.read().await;
        let button = ButtonConfig::derive(&ButtonInput {
            kind: self.kind,
            connected: self.ctx.wallet.is_connected(),
            state: state.workflow,
            amount: &state.amount,
            balance: state.panel.spendable_balance(),
            allowance: state.panel.allowance(),
            wrap: state.wrap,
        });

        let estimated_wsteth = match &state.panel {
            PanelData::Stake(panel) if state.wrap => TokenAmount::from_decimal_str(&state.amount)
                .ok()
                .zip(panel.steth_per_token)
                .and_then(|(amount, rate)| amount.div_by_rate(&rate)),
            _ => None,
        };

        let notes = match self.kind {
            BlockKind::AaveSupply => vec!["Gas fee: ~0.001 ETH", "Supply cap: 100,000 wstETH"],
            BlockKind::LidoStake if state.wrap => vec!["Gas fee: ~0.003 ETH", "Min stake: 0.001 ETH"],
            BlockKind::LidoStake => vec!["Gas fee: ~0.001 ETH", "Min stake: 0.001 ETH"],
        };

        BlockView {
            id: self.id,
            kind: self.kind,
            title: self.kind.display_name(),
            workflow: state.workflow,
            amount: state.amount.clone(),
            wrap: state.wrap,
            panel: state.panel.clone(),
            button,
            estimated_wsteth,
            notes,
            refresh_count: self.refreshes.load(Ordering::SeqCst),
        }
    }

    // ── Reads ────────────────────────────────────────────────────────────────

    async fn refresh(&self) -> FlowResult<()> {
        if self.is_detached() {
            return Ok(());
        }
        // Nothing to read without an address
        let Some(user) = self.ctx.wallet.address() else {
            return Ok(());
        };

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let loaded = match self.kind {
            BlockKind::AaveSupply => self.load_supply(user).await.map(PanelData::Supply),
            BlockKind::LidoStake => self.load_stake(user).await.map(PanelData::Stake),
        };
        if self.is_detached() {
            return Ok(());
        }

        let panel = match loaded {
            Ok(panel) => panel,
            Err(err) => {
                // Keep showing the previous values
                self.report_failure(ChainOp::Read, "Loading block data", &err);
                self.evaluate().await;
                return Err(FlowError::Chain(err));
            }
        };

        let applied = {
            let mut state = self.state.write().await;
            if generation > state.panel_generation {
                state.panel = panel;
                state.panel_generation = generation;
                true
            } else {
                false
            }
        };
        if !applied {
            tracing::debug!(block = %self.id, generation, "dropping stale block data");
            return Ok(());
        }

        let refresh_count = self.refreshes.fetch_add(1, Ordering::SeqCst) + 1;
        self.ctx.events.emit(FlowEvent::BlockRefreshed {
            block_id: self.id,
            refresh_count,
            timestamp: Utc::now(),
        });

        self.evaluate().await;
        Ok(())
    }

    async fn load_supply(&self, user: Address) -> ChainResult<SupplyPanel> {
        let adapter = &self.ctx.adapter;
        let c = &self.ctx.contracts;
        let (balance, allowance, apy, account) = tokio::try_join!(
            adapter.get_balance(Token::Erc20(c.supply_asset), user),
            adapter.get_allowance(c.supply_asset, user, c.pool),
            adapter.supply_apy(c.pool, c.supply_asset),
            adapter.user_account_data(c.pool, user),
        )?;
        Ok(SupplyPanel {
            balance: Some(balance),
            allowance: Some(allowance),
            apy: Some(apy),
            account: Some(account),
        })
    }

    async fn load_stake(&self, user: Address) -> ChainResult<StakePanel> {
        let adapter = &self.ctx.adapter;
        let c = &self.ctx.contracts;
        let (eth, steth, wsteth, rate) = tokio::try_join!(
            adapter.get_native_balance(user),
            adapter.get_balance(Token::Erc20(c.steth), user),
            adapter.get_balance(Token::Erc20(c.wsteth), user),
            adapter.steth_per_token(c.wsteth),
        )?;
        Ok(StakePanel {
            eth_balance: Some(eth),
            steth_balance: Some(steth),
            wsteth_balance: Some(wsteth),
            steth_per_token: Some(rate),
            apr: self.ctx.stake_apr,
        })
    }

    /// Settle Checking/NeedsApproval/Ready against the current panel data
    async fn evaluate(&self) {
        let mut state = self.state.write().await;
        if !matches!(
            state.workflow,
            WorkflowState::Checking | WorkflowState::NeedsApproval | WorkflowState::Ready
        ) {
            return;
        }
        let needs_approval = match (self.kind, TokenAmount::from_decimal_str(&state.amount)) {
            (BlockKind::AaveSupply, Ok(amount)) => {
                amount > state.panel.allowance().unwrap_or(TokenAmount::ZERO)
            }
            _ => false,
        };
        let from = state.workflow;
        if let Ok(to) = from.apply(WorkflowEvent::Evaluated { needs_approval }) {
            state.workflow = to;
            drop(state);
            self.emit_transition(from, to);
        }
    }

    // ── Edits ────────────────────────────────────────────────────────────────

    async fn set_amount(&self, text: String) -> FlowResult<()> {
        let empty = text.trim().is_empty();
        let (from, to) = {
            let mut state = self.state.write().await;
            let from = state.workflow;
            let to = from
                .apply(WorkflowEvent::AmountEdited { empty })
                .map_err(|_| FlowError::Busy(self.id))?;
            state.workflow = to;
            state.amount = text;
            (from, to)
        };
        self.emit_transition(from, to);

        if to == WorkflowState::Checking {
            // Read failures are already reported on the bus
            let _ = self.refresh().await;
        }
        Ok(())
    }

    // ── Workflows ────────────────────────────────────────────────────────────

    async fn transition(&self, event: WorkflowEvent) -> FlowResult<WorkflowState> {
        let (from, to) = {
            let mut state = self.state.write().await;
            let from = state.workflow;
            let to = from.apply(event)?;
            state.workflow = to;
            (from, to)
        };
        self.emit_transition(from, to);
        Ok(to)
    }

    fn emit_transition(&self, from: WorkflowState, to: WorkflowState) {
        if from == to {
            return;
        }
        tracing::debug!(block = %self.id, %from, %to, "workflow transition");
        self.ctx.events.emit(FlowEvent::WorkflowChanged {
            block_id: self.id,
            from,
            to,
            timestamp: Utc::now(),
        });
    }

    async fn entered_amount(&self) -> FlowResult<TokenAmount> {
        let state = self.state.read().await;
        if state.workflow.is_busy() {
            return Err(FlowError::Busy(self.id));
        }
        let amount = TokenAmount::from_decimal_str(&state.amount)?;
        if amount.is_zero() {
            return Err(FlowError::ActionUnavailable("Enter Amount".to_string()));
        }
        Ok(amount)
    }

    async fn approve(&self) -> FlowResult<WorkflowOutcome> {
        if self.kind != BlockKind::AaveSupply {
            return Err(FlowError::ActionUnavailable("Approve".to_string()));
        }
        let from = self.signer()?;
        let amount = self.entered_amount().await?;
        self.transition(WorkflowEvent::ApproveRequested).await?;

        let approved = self.approve_pool(from, amount).await;
        if self.is_detached() {
            return Ok(WorkflowOutcome::Discarded);
        }
        match approved {
            Ok(_) => {
                self.transition(WorkflowEvent::ApprovalConfirmed).await?;
                self.ctx
                    .events
                    .notify(Some(self.id), NotificationLevel::Success, "Approval successful");
                let _ = self.refresh().await;
                Ok(WorkflowOutcome::Approved)
            }
            Err(err) => {
                self.transition(WorkflowEvent::ApprovalFailed).await?;
                self.report_failure(ChainOp::Write, "Approval", &err);
                Err(FlowError::Chain(err))
            }
        }
    }

    async fn submit(&self) -> FlowResult<WorkflowOutcome> {
        let from = self.signer()?;
        let amount = self.entered_amount().await?;
        match self.kind {
            BlockKind::AaveSupply => self.run_supply(from, amount).await,
            BlockKind::LidoStake => {
                let wrap = self.state.read().await.wrap;
                self.run_stake(from, amount, wrap).await
            }
        }
    }

    async fn run_supply(&self, from: Address, amount: TokenAmount) -> FlowResult<WorkflowOutcome> {
        let c = self.ctx.contracts;
        // Decide on a fresh allowance, not the last poll
        let allowance = match self.ctx.adapter.get_allowance(c.supply_asset, from, c.pool).await {
            Ok(allowance) => allowance,
            Err(err) => {
                self.report_failure(ChainOp::Read, "Checking allowance", &err);
                return Err(FlowError::Chain(err));
            }
        };
        let needs_approval = amount > allowance;
        self.transition(WorkflowEvent::SubmitRequested {
            step: SubmitStep::Supply,
            needs_approval,
        })
        .await?;

        if needs_approval {
            let approved = self.approve_pool(from, amount).await;
            if self.is_detached() {
                return Ok(WorkflowOutcome::Discarded);
            }
            if let Err(err) = approved {
                self.transition(WorkflowEvent::ApprovalFailed).await?;
                self.report_failure(ChainOp::Write, "Approval", &err);
                return Err(FlowError::Chain(err));
            }
            self.transition(WorkflowEvent::ApprovalConfirmed).await?;
        }

        let supplied = self.run_step(from, SubmitStep::Supply, amount).await;
        if self.is_detached() {
            return Ok(WorkflowOutcome::Discarded);
        }
        match supplied {
            Ok(_) => self.complete("Supply successful").await,
            Err(err) => {
                self.transition(WorkflowEvent::SubmitFailed).await?;
                self.report_failure(ChainOp::Write, "Supply", &err);
                Err(FlowError::Chain(err))
            }
        }
    }

    async fn run_stake(&self, from: Address, amount: TokenAmount, wrap: bool) -> FlowResult<WorkflowOutcome> {
        self.transition(WorkflowEvent::SubmitRequested {
            step: SubmitStep::Stake,
            needs_approval: false,
        })
        .await?;

        let steps: &[SubmitStep] = if wrap {
            &[SubmitStep::Stake, SubmitStep::ApproveWrap, SubmitStep::Wrap]
        } else {
            &[SubmitStep::Stake]
        };

        for (index, step) in steps.iter().copied().enumerate() {
            if index > 0 {
                self.transition(WorkflowEvent::StepStarted(step)).await?;
            }
            let result = self.run_step(from, step, amount).await;
            if self.is_detached() {
                return Ok(WorkflowOutcome::Discarded);
            }
            if let Err(err) = result {
                self.transition(WorkflowEvent::SubmitFailed).await?;
                self.report_failure(ChainOp::Write, step_action(step), &err);
                return Err(FlowError::Chain(err));
            }
        }

        let message = if wrap {
            "Successfully staked and wrapped ETH"
        } else {
            "Successfully staked ETH"
        };
        self.complete(message).await
    }

    async fn approve_pool(&self, from: Address, amount: TokenAmount) -> ChainResult<TxReceipt> {
        let c = self.ctx.contracts;
        self.send_and_confirm("approve", self.ctx.adapter.approve(from, c.supply_asset, c.pool, amount))
            .await
    }

    async fn run_step(&self, from: Address, step: SubmitStep, amount: TokenAmount) -> ChainResult<TxReceipt> {
        let adapter = &self.ctx.adapter;
        let c = self.ctx.contracts;
        match step {
            SubmitStep::Supply => {
                self.send_and_confirm("supply", adapter.supply(from, c.pool, c.supply_asset, amount, from))
                    .await
            }
            SubmitStep::Stake => self.send_and_confirm("submit", adapter.stake(from, c.steth, amount)).await,
            SubmitStep::ApproveWrap => {
                self.send_and_confirm("approve", adapter.approve(from, c.steth, c.wsteth, amount))
                    .await
            }
            SubmitStep::Wrap => self.send_and_confirm("wrap", adapter.wrap(from, c.wsteth, amount)).await,
        }
    }

    async fn send_and_confirm<F>(&self, method: &'static str, send: F) -> ChainResult<TxReceipt>
    where
        F: Future<Output = ChainResult<TxHandle>>,
    {
        let tx = send.await?;
        if !self.is_detached() {
            self.ctx.events.emit(FlowEvent::TransactionSubmitted {
                block_id: self.id,
                method: method.to_string(),
                tx_hash: tx.to_string(),
                timestamp: Utc::now(),
            });
        }

        let receipt = self.ctx.adapter.wait_for_confirmation(&tx).await?;
        if !self.is_detached() {
            tracing::info!(block = %self.id, method, tx = %tx, block_number = receipt.block_number, "transaction confirmed");
            self.ctx.events.emit(FlowEvent::TransactionConfirmed {
                block_id: self.id,
                method: method.to_string(),
                tx_hash: tx.to_string(),
                block_number: receipt.block_number,
                timestamp: Utc::now(),
            });
        }
        Ok(receipt)
    }

    /// Final confirmation: back to Idle with an empty amount, then one refresh
    async fn complete(&self, message: &str) -> FlowResult<WorkflowOutcome> {
        let (from, to) = {
            let mut state = self.state.write().await;
            let from = state.workflow;
            let to = from.apply(WorkflowEvent::Confirmed)?;
            state.workflow = to;
            state.amount.clear();
            (from, to)
        };
        self.emit_transition(from, to);
        self.ctx.events.notify(Some(self.id), NotificationLevel::Success, message);
        let _ = self.refresh().await;
        Ok(WorkflowOutcome::Confirmed)
    }

    fn report_failure(&self, op: ChainOp, action: &str, err: &ChainError) {
        let message = match err.failure_kind(op) {
            FailureKind::SignatureRejected => format!("{} rejected in wallet", action),
            FailureKind::TransactionReverted | FailureKind::ReadFailure => {
                format!("{} failed: {}", action, err)
            }
        };
        tracing::warn!(block = %self.id, code = err.error_code(), error = %err, "{}", message);
        self.ctx.events.notify(Some(self.id), NotificationLevel::Error, message);
    }
}

fn step_action(step: SubmitStep) -> &'static str {
    match step {
        SubmitStep::Supply => "Supply",
        SubmitStep::Stake => "Staking",
        SubmitStep::ApproveWrap => "Wrap approval",
        SubmitStep::Wrap => "Wrap",
    }
}
