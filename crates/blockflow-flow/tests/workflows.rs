use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use blockflow_chain::{
    ChainClient, DemoSigner, ReadCall, SimulatedChain, TxHandle, TxReceipt, UserAccountData, WriteCall,
};
use blockflow_flow::{
    BlockController, FlowApp, FlowConfig, FlowError, FlowEvent, NotificationLevel, PanelData, SubmitStep,
    WorkflowOutcome, WorkflowState,
};
use blockflow_types::{Address, BlockKind, ChainError, ChainResult, TokenAmount, U256};
use tokio::sync::{broadcast, Notify};

fn test_config() -> FlowConfig {
    FlowConfig {
        poll_secs: 3600,
        confirm_ms: 0,
        ..FlowConfig::default()
    }
}

async fn connected_app() -> (FlowApp, Arc<SimulatedChain>, Address) {
    let (app, chain) = FlowApp::simulated(test_config()).unwrap();
    let user = DemoSigner::for_label("tester").unwrap().address();
    app.connect_wallet(user).await;
    (app, chain, user)
}

async fn mount(app: &FlowApp, kind: BlockKind) -> Arc<BlockController> {
    let block = app.add_block(kind).await;
    app.block(block.id).unwrap()
}

fn drain(rx: &mut broadcast::Receiver<FlowEvent>) -> Vec<FlowEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn methods(chain: &SimulatedChain) -> Vec<&'static str> {
    chain.submitted_calls().iter().map(|(_, call)| call.method()).collect()
}

async fn wait_until_busy(block: &BlockController) {
    for _ in 0..1_000 {
        if block.workflow().await.is_busy() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("workflow never started");
}

fn tokens(s: &str) -> TokenAmount {
    TokenAmount::from_decimal_str(s).unwrap()
}

/// Simulated chain whose next allowance read waits for `release`
struct SlowAllowance {
    chain: Arc<SimulatedChain>,
    armed: AtomicBool,
    parked: AtomicBool,
    release: Notify,
}

impl SlowAllowance {
    fn new(chain: Arc<SimulatedChain>) -> Self {
        Self {
            chain,
            armed: AtomicBool::new(false),
            parked: AtomicBool::new(false),
            release: Notify::new(),
        }
    }
}

#[async_trait]
impl ChainClient for SlowAllowance {
    fn name(&self) -> &'static str {
        "slow-allowance"
    }

    async fn read(&self, call: ReadCall) -> ChainResult<U256> {
        if matches!(call, ReadCall::Allowance { .. }) && self.armed.swap(false, Ordering::SeqCst) {
            // Answer with what the chain says now, deliver it later
            let answer = self.chain.read(call).await;
            self.parked.store(true, Ordering::SeqCst);
            self.release.notified().await;
            return answer;
        }
        self.chain.read(call).await
    }

    async fn read_account(&self, pool: Address, user: Address) -> ChainResult<UserAccountData> {
        self.chain.read_account(pool, user).await
    }

    async fn send(&self, from: Address, call: WriteCall) -> ChainResult<TxHandle> {
        self.chain.send(from, call).await
    }

    async fn wait_for_receipt(&self, tx: &TxHandle) -> ChainResult<TxReceipt> {
        self.chain.wait_for_receipt(tx).await
    }
}

// ── Supply ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_approve_then_supply() {
    let (app, chain, user) = connected_app().await;
    let c = *app.contracts();
    chain.mint(c.supply_asset, user, TokenAmount::from_tokens(10));
    let block = mount(&app, BlockKind::AaveSupply).await;

    block.set_amount("1.5").await.unwrap();
    assert_eq!(block.workflow().await, WorkflowState::NeedsApproval);
    let button = block.button().await;
    assert_eq!((button.label.as_str(), button.enabled), ("Approve", true));

    assert_eq!(block.primary_action().await.unwrap(), WorkflowOutcome::Approved);
    assert_eq!(chain.allowance_of(c.supply_asset, user, c.pool), tokens("1.5"));
    assert_eq!(block.workflow().await, WorkflowState::Ready);
    let button = block.button().await;
    assert_eq!((button.label.as_str(), button.enabled), ("Supply", true));

    assert_eq!(block.primary_action().await.unwrap(), WorkflowOutcome::Confirmed);
    assert_eq!(block.workflow().await, WorkflowState::Idle);
    assert_eq!(block.amount().await, "");
    assert_eq!(chain.supplied_of(c.supply_asset, user), tokens("1.5"));
    assert_eq!(chain.balance_of(c.supply_asset, user), tokens("8.5"));
    assert_eq!(methods(&chain), vec!["approve", "supply"]);

    match block.view().await.panel {
        PanelData::Supply(panel) => {
            assert_eq!(panel.balance, Some(tokens("8.5")));
            assert_eq!(panel.account.unwrap().total_collateral_base, tokens("1.5").wei());
            assert!((panel.apy.unwrap() - 2.75).abs() < 1e-9);
        }
        other => panic!("unexpected panel {:?}", other),
    }
}

#[tokio::test]
async fn test_supply_approves_transparently() {
    let (app, chain, user) = connected_app().await;
    let c = *app.contracts();
    chain.mint(c.supply_asset, user, TokenAmount::from_tokens(5));
    let block = mount(&app, BlockKind::AaveSupply).await;
    let mut events = app.subscribe();

    block.set_amount("2").await.unwrap();
    assert_eq!(block.submit().await.unwrap(), WorkflowOutcome::Confirmed);

    assert_eq!(methods(&chain), vec!["approve", "supply"]);
    assert_eq!(chain.supplied_of(c.supply_asset, user), TokenAmount::from_tokens(2));

    let states: Vec<_> = drain(&mut events)
        .into_iter()
        .filter_map(|e| match e {
            FlowEvent::WorkflowChanged { to, .. } => Some(to),
            _ => None,
        })
        .collect();
    assert!(states.contains(&WorkflowState::Approving { then_submit: true }));
    assert!(states.contains(&WorkflowState::Submitting { step: SubmitStep::Supply }));
    assert_eq!(states.last(), Some(&WorkflowState::Idle));
}

#[tokio::test]
async fn test_late_poll_does_not_undo_approval() {
    let config = test_config();
    let chain = Arc::new(SimulatedChain::new(config.contracts().unwrap()).with_confirm_delay(Duration::ZERO));
    let client = Arc::new(SlowAllowance::new(chain.clone()));
    let app = FlowApp::new(config, client.clone()).unwrap();
    let user = DemoSigner::for_label("slow").unwrap().address();
    app.connect_wallet(user).await;
    let c = *app.contracts();
    chain.mint(c.supply_asset, user, TokenAmount::from_tokens(10));
    let block = mount(&app, BlockKind::AaveSupply).await;

    block.set_amount("1.5").await.unwrap();
    assert_eq!(block.workflow().await, WorkflowState::NeedsApproval);
    let refreshes = block.refresh_count();

    // A poll reads the zero allowance, then stalls
    client.armed.store(true, Ordering::SeqCst);
    let poll = {
        let block = block.clone();
        tokio::spawn(async move { block.refresh().await })
    };
    while !client.parked.load(Ordering::SeqCst) {
        tokio::task::yield_now().await;
    }

    assert_eq!(block.approve().await.unwrap(), WorkflowOutcome::Approved);
    assert_eq!(block.button().await.label, "Supply");

    client.release.notify_one();
    poll.await.unwrap().unwrap();

    assert_eq!(chain.allowance_of(c.supply_asset, user, c.pool), tokens("1.5"));
    assert_eq!(block.workflow().await, WorkflowState::Ready);
    assert_eq!(block.button().await.label, "Supply");
    match block.view().await.panel {
        PanelData::Supply(panel) => assert_eq!(panel.allowance, Some(tokens("1.5"))),
        other => panic!("unexpected panel {:?}", other),
    }
    // Only the load after the approval counts
    assert_eq!(block.refresh_count(), refreshes + 1);
}

#[tokio::test]
async fn test_supply_apy_follows_liquidity_rate() {
    let (app, chain, _user) = connected_app().await;
    // 3.12 % in ray
    chain.set_liquidity_rate(U256::from(31_200_000_000_000_000_000_000_000u128));
    let block = mount(&app, BlockKind::AaveSupply).await;

    match block.view().await.panel {
        PanelData::Supply(panel) => assert!((panel.apy.unwrap() - 3.12).abs() < 1e-9),
        other => panic!("unexpected panel {:?}", other),
    }
}

#[tokio::test]
async fn test_button_labels() {
    let (app, chain, user) = connected_app().await;
    let c = *app.contracts();
    chain.mint(c.supply_asset, user, TokenAmount::from_tokens(1));
    let block = mount(&app, BlockKind::AaveSupply).await;

    let button = block.button().await;
    assert_eq!((button.label.as_str(), button.enabled), ("Enter Amount", false));

    block.set_amount("1..2").await.unwrap();
    assert_eq!(block.button().await.label, "Invalid Amount");

    block.set_amount("1.01").await.unwrap();
    assert_eq!(block.button().await.label, "Insufficient wstETH");

    block.set_amount("").await.unwrap();
    assert_eq!(block.workflow().await, WorkflowState::Idle);
    assert!(matches!(block.primary_action().await, Err(FlowError::ActionUnavailable(_))));
}

#[tokio::test]
async fn test_disconnected_wallet_overrides_amount() {
    let (app, chain) = FlowApp::simulated(test_config()).unwrap();
    let block = mount(&app, BlockKind::LidoStake).await;
    assert_eq!(block.refresh_count(), 0);

    for amount in ["", "1", "abc"] {
        block.set_amount(amount).await.unwrap();
        let button = block.button().await;
        assert_eq!((button.label.as_str(), button.enabled), ("Connect Wallet", false));
    }
    assert!(matches!(block.submit().await, Err(FlowError::WalletDisconnected)));
    assert!(chain.submitted_calls().is_empty());
    assert_eq!(app.wallet_banner(), "Connect Wallet");
}

#[tokio::test]
async fn test_connecting_refreshes_blocks() {
    let (app, chain) = FlowApp::simulated(test_config()).unwrap();
    let user = DemoSigner::for_label("late").unwrap().address();
    chain.fund_native(user, TokenAmount::from_tokens(3));
    let block = mount(&app, BlockKind::LidoStake).await;

    app.connect_wallet(user).await;
    assert_eq!(block.refresh_count(), 1);
    assert!(app.wallet_banner().starts_with("Connected: 0x"));
    match block.view().await.panel {
        PanelData::Stake(panel) => {
            assert_eq!(panel.eth_balance, Some(TokenAmount::from_tokens(3)));
            assert_eq!(panel.apr, 4.8);
        }
        other => panic!("unexpected panel {:?}", other),
    }

    app.disconnect_wallet();
    assert_eq!(block.button().await.label, "Connect Wallet");
}

#[tokio::test]
async fn test_failed_approval_returns_to_needs_approval() {
    let (app, chain, user) = connected_app().await;
    let c = *app.contracts();
    chain.mint(c.supply_asset, user, TokenAmount::from_tokens(4));
    let block = mount(&app, BlockKind::AaveSupply).await;
    let mut events = app.subscribe();

    block.set_amount("1").await.unwrap();
    chain.reject_next_signature();
    let err = block.primary_action().await.unwrap_err();
    assert_eq!(err, FlowError::Chain(ChainError::SignatureRejected));
    assert_eq!(block.workflow().await, WorkflowState::NeedsApproval);
    assert_eq!(block.amount().await, "1");

    let failed = drain(&mut events).into_iter().any(|e| {
        matches!(e, FlowEvent::Notification { level: NotificationLevel::Error, ref message, .. }
            if message.contains("rejected"))
    });
    assert!(failed);
    assert_eq!(block.button().await.label, "Approve");
}

#[tokio::test]
async fn test_failed_supply_returns_to_ready() {
    let (app, chain, user) = connected_app().await;
    let c = *app.contracts();
    chain.mint(c.supply_asset, user, TokenAmount::from_tokens(4));
    chain.set_allowance(c.supply_asset, user, c.pool, TokenAmount::from_tokens(4));
    let block = mount(&app, BlockKind::AaveSupply).await;

    block.set_amount("3").await.unwrap();
    assert_eq!(block.workflow().await, WorkflowState::Ready);

    chain.revert_next_transaction();
    let err = block.primary_action().await.unwrap_err();
    assert!(matches!(err, FlowError::Chain(ChainError::TransactionReverted { .. })));
    assert_eq!(block.workflow().await, WorkflowState::Ready);
    assert_eq!(block.button().await.label, "Supply");
    assert_eq!(chain.supplied_of(c.supply_asset, user), TokenAmount::ZERO);
}

#[tokio::test]
async fn test_read_failure_keeps_previous_values() {
    let (app, chain, user) = connected_app().await;
    let c = *app.contracts();
    chain.mint(c.supply_asset, user, TokenAmount::from_tokens(7));
    let block = mount(&app, BlockKind::AaveSupply).await;
    let before = block.view().await.panel;
    let mut events = app.subscribe();

    let refreshes = block.refresh_count();
    chain.set_offline(true);
    chain.mint(c.supply_asset, user, TokenAmount::from_tokens(1));
    assert!(block.refresh().await.is_err());
    assert_eq!(block.view().await.panel, before);
    assert_eq!(block.refresh_count(), refreshes);
    let events = drain(&mut events);
    assert!(events
        .iter()
        .any(|e| matches!(e, FlowEvent::Notification { level: NotificationLevel::Error, .. })));
    assert!(!events.iter().any(|e| matches!(e, FlowEvent::BlockRefreshed { .. })));

    chain.set_offline(false);
    block.refresh().await.unwrap();
    assert_ne!(block.view().await.panel, before);
    assert_eq!(block.refresh_count(), refreshes + 1);
}

#[tokio::test]
async fn test_max_uses_full_precision_balance() {
    let (app, chain, user) = connected_app().await;
    let c = *app.contracts();
    chain.mint(c.supply_asset, user, tokens("0.123456789012345678"));
    let block = mount(&app, BlockKind::AaveSupply).await;

    block.set_max().await.unwrap();
    assert_eq!(block.amount().await, "0.123456789012345678");
    assert_eq!(block.button().await.label, "Approve");
}

// ── Stake ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_stake_and_wrap_refreshes_once_after_last_confirmation() {
    let (app, chain, user) = connected_app().await;
    let c = *app.contracts();
    chain.fund_native(user, TokenAmount::from_tokens(5));
    chain.set_steth_per_token(tokens("1.25"));
    let block = mount(&app, BlockKind::LidoStake).await;

    block.set_wrap(true).await.unwrap();
    block.set_amount("2.5").await.unwrap();
    let view = block.view().await;
    assert_eq!(view.button.label, "Stake & Wrap");
    assert_eq!(view.estimated_wsteth, Some(TokenAmount::from_tokens(2)));

    let refreshes_before = block.refresh_count();
    let mut events = app.subscribe();
    assert_eq!(block.primary_action().await.unwrap(), WorkflowOutcome::Confirmed);

    assert_eq!(block.workflow().await, WorkflowState::Idle);
    assert_eq!(block.amount().await, "");
    assert_eq!(block.refresh_count(), refreshes_before + 1);
    assert_eq!(methods(&chain), vec!["submit", "approve", "wrap"]);
    assert_eq!(chain.native_balance_of(user), tokens("2.5"));
    assert_eq!(chain.balance_of(c.wsteth, user), TokenAmount::from_tokens(2));

    let events = drain(&mut events);
    let last_confirmation = events
        .iter()
        .rposition(|e| matches!(e, FlowEvent::TransactionConfirmed { .. }))
        .unwrap();
    let refreshes: Vec<_> = events
        .iter()
        .enumerate()
        .filter(|(_, e)| matches!(e, FlowEvent::BlockRefreshed { .. }))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(refreshes.len(), 1);
    assert!(refreshes[0] > last_confirmation);

    match block.view().await.panel {
        PanelData::Stake(panel) => assert_eq!(panel.wsteth_balance, Some(TokenAmount::from_tokens(2))),
        other => panic!("unexpected panel {:?}", other),
    }
}

#[tokio::test]
async fn test_rejected_stake_aborts_chain() {
    let (app, chain, user) = connected_app().await;
    chain.fund_native(user, TokenAmount::from_tokens(5));
    let block = mount(&app, BlockKind::LidoStake).await;
    block.set_wrap(true).await.unwrap();
    block.set_amount("1").await.unwrap();

    chain.reject_next_signature();
    let err = block.primary_action().await.unwrap_err();
    assert_eq!(err, FlowError::Chain(ChainError::SignatureRejected));
    assert!(chain.submitted_calls().is_empty());
    assert_eq!(block.workflow().await, WorkflowState::Ready);
    assert_eq!(block.amount().await, "1");
}

#[tokio::test]
async fn test_failed_wrap_leaves_stake_in_place() {
    let (app, chain, user) = connected_app().await;
    let c = *app.contracts();
    chain.fund_native(user, TokenAmount::from_tokens(5));
    // A zero rate makes the wrapper revert
    chain.set_steth_per_token(TokenAmount::ZERO);
    let block = mount(&app, BlockKind::LidoStake).await;
    block.set_wrap(true).await.unwrap();
    block.set_amount("1").await.unwrap();

    assert!(block.primary_action().await.is_err());
    assert_eq!(block.workflow().await, WorkflowState::Ready);
    assert_eq!(methods(&chain), vec!["submit", "approve", "wrap"]);
    assert_eq!(chain.balance_of(c.steth, user), TokenAmount::from_tokens(1));
    assert_eq!(chain.balance_of(c.wsteth, user), TokenAmount::ZERO);
}

#[tokio::test]
async fn test_busy_block_rejects_actions() {
    let (app, chain, user) = connected_app().await;
    chain.fund_native(user, TokenAmount::from_tokens(5));
    let block = mount(&app, BlockKind::LidoStake).await;
    block.set_amount("1").await.unwrap();

    chain.hold_confirmations();
    let running = {
        let block = block.clone();
        tokio::spawn(async move { block.primary_action().await })
    };
    wait_until_busy(&block).await;

    assert_eq!(block.button().await.label, "Staking...");
    assert!(!block.button().await.enabled);
    assert!(matches!(block.set_amount("2").await, Err(FlowError::Busy(_))));
    assert!(matches!(block.set_wrap(true).await, Err(FlowError::Busy(_))));
    assert!(matches!(block.submit().await, Err(FlowError::Busy(_))));
    assert!(matches!(block.primary_action().await, Err(FlowError::ActionUnavailable(_))));

    chain.release_confirmations();
    assert_eq!(running.await.unwrap().unwrap(), WorkflowOutcome::Confirmed);
    assert_eq!(methods(&chain), vec!["submit"]);
}

#[tokio::test]
async fn test_approve_is_supply_only() {
    let (app, _chain, _user) = connected_app().await;
    let block = mount(&app, BlockKind::LidoStake).await;
    block.set_amount("1").await.unwrap();
    assert!(matches!(block.approve().await, Err(FlowError::ActionUnavailable(_))));

    let supply = mount(&app, BlockKind::AaveSupply).await;
    assert!(matches!(supply.set_wrap(true).await, Err(FlowError::ActionUnavailable(_))));
}

// ── Unmount ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_removed_block_discards_late_results() {
    let (app, chain, user) = connected_app().await;
    chain.fund_native(user, TokenAmount::from_tokens(5));
    let block = mount(&app, BlockKind::LidoStake).await;
    block.set_wrap(true).await.unwrap();
    block.set_amount("1").await.unwrap();
    assert!(block.is_polling());

    chain.hold_confirmations();
    let running = {
        let block = block.clone();
        tokio::spawn(async move { block.primary_action().await })
    };
    wait_until_busy(&block).await;
    let refreshes = block.refresh_count();

    app.remove_block(block.id()).unwrap();
    assert!(!block.is_mounted());
    assert!(!block.is_polling());

    chain.release_confirmations();
    assert_eq!(running.await.unwrap().unwrap(), WorkflowOutcome::Discarded);
    // The stake still lands on chain, the wrap steps are never sent
    assert_eq!(methods(&chain), vec!["submit"]);
    assert_eq!(chain.native_balance_of(user), TokenAmount::from_tokens(4));
    assert_eq!(block.workflow().await, WorkflowState::Submitting { step: SubmitStep::Stake });
    assert_eq!(block.refresh_count(), refreshes);
}

#[tokio::test(start_paused = true)]
async fn test_poller_runs_until_removal() {
    let config = FlowConfig {
        poll_secs: 30,
        confirm_ms: 0,
        ..FlowConfig::default()
    };
    let (app, chain) = FlowApp::simulated(config).unwrap();
    let user = DemoSigner::for_label("poller").unwrap().address();
    chain.fund_native(user, TokenAmount::from_tokens(1));
    app.connect_wallet(user).await;
    let block = mount(&app, BlockKind::LidoStake).await;
    assert_eq!(block.refresh_count(), 1);

    tokio::time::sleep(Duration::from_secs(95)).await;
    let polled = block.refresh_count();
    assert!(polled >= 3, "expected periodic refreshes, got {}", polled);

    app.remove_block(block.id());
    tokio::time::sleep(Duration::from_secs(300)).await;
    assert_eq!(block.refresh_count(), polled);
}

#[tokio::test]
async fn test_submitted_calls_carry_signer() {
    let (app, chain, user) = connected_app().await;
    chain.fund_native(user, TokenAmount::from_tokens(2));
    let block = mount(&app, BlockKind::LidoStake).await;
    block.set_amount("0.5").await.unwrap();
    block.primary_action().await.unwrap();

    let (from, call) = chain.submitted_calls().remove(0);
    assert_eq!(from, user);
    assert!(matches!(call, WriteCall::Submit { referral, .. } if referral == user));
}
