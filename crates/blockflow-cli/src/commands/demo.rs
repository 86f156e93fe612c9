//! Demo command - scripted walk through both block workflows

use std::sync::Arc;
use std::time::Duration;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use blockflow_chain::{DemoSigner, SimulatedChain};
use blockflow_flow::{BlockController, DropEvent, FlowApp, FlowConfig, FlowEvent, PanelData, WorkflowOutcome};
use blockflow_types::{short_address, Address, BlockKind, Position};

use super::seed_demo_wallet;
use crate::display;

/// Run the walkthrough: place two blocks, supply with the automatic
/// approval, then stake and wrap
pub async fn run_demo(config: FlowConfig, json: bool) -> anyhow::Result<()> {
    let signer = DemoSigner::for_label(&config.wallet_label)?;
    let (app, chain) = FlowApp::simulated(config)?;
    let mut events = app.subscribe();

    let pb = ProgressBar::new(5);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("█▓░"),
    );
    pb.enable_steady_tick(Duration::from_millis(120));
    if json {
        pb.set_draw_target(indicatif::ProgressDrawTarget::hidden());
    }

    // Step 1: seed and connect
    pb.set_message("Connecting demo wallet...");
    seed_demo_wallet(&chain, signer.address());
    app.connect_wallet(signer.address()).await;
    pb.inc(1);

    // Step 2: place blocks
    pb.set_message("Placing blocks...");
    let supply = app.add_block(BlockKind::AaveSupply).await;
    let stake = app.add_block(BlockKind::LidoStake).await;
    let landed = app.drop_block(DropEvent {
        id: stake.id,
        start: stake.position,
        delta: Position::new(257, 13),
    });
    pb.inc(1);

    let supply_block = app
        .block(supply.id)
        .ok_or_else(|| anyhow::anyhow!("supply block not mounted"))?;
    let stake_block = app
        .block(stake.id)
        .ok_or_else(|| anyhow::anyhow!("stake block not mounted"))?;

    // Step 3: supply, approving on the way
    pb.set_message("Supplying 1.5 wstETH (approve + supply)...");
    supply_block.set_amount("1.5").await?;
    let supplied = supply_block.submit().await?;
    pb.inc(1);

    // Step 4: stake and wrap
    pb.set_message("Staking 1 ETH and wrapping...");
    stake_block.set_amount("1").await?;
    stake_block.set_wrap(true).await?;
    let staked = stake_block.primary_action().await?;
    pb.inc(1);

    pb.set_message("Collecting results...");
    let mut log = Vec::new();
    while let Ok(event) = events.try_recv() {
        log.push(event);
    }
    pb.inc(1);
    pb.finish_and_clear();
    app.shutdown();

    if json {
        for event in &log {
            println!("{}", serde_json::to_string(event)?);
        }
        return Ok(());
    }

    display::section("Step 1: Wallet");
    display::success(&format!("Connected {}", short_address(&signer.address())));
    display::kv("ETH", &format!("{}", super::DEMO_ETH));
    display::kv("wstETH", &format!("{}", super::DEMO_WSTETH));

    display::section("Step 2: Canvas");
    display::success(&format!("{} placed at {}", supply.kind.display_name(), supply.position));
    display::success(&format!(
        "{} dropped by (257, 13), snapped to {}",
        stake.kind.display_name(),
        landed
    ));

    display::section("Step 3: AAVE Supply");
    print_outcome(supplied, "1.5 wstETH supplied");
    print_supply_state(&chain, signer.address());

    display::section("Step 4: Lido Stake & Wrap");
    print_outcome(staked, "1 ETH staked and wrapped");
    print_stake_state(&stake_block, &chain, signer.address()).await;

    display::section("Event Log");
    for event in &log {
        let line = event.summary();
        match event {
            FlowEvent::TransactionSubmitted { .. } | FlowEvent::TransactionConfirmed { .. } => {
                println!("  {}", line.bright_yellow())
            }
            _ => println!("  {}", line.bright_black()),
        }
    }

    let calls = chain.submitted_calls();
    println!();
    println!(
        "  {} {} transactions, {} events",
        "Summary:".bright_white().bold(),
        calls.len().to_string().bright_cyan(),
        log.len().to_string().bright_cyan()
    );
    Ok(())
}

fn print_outcome(outcome: WorkflowOutcome, message: &str) {
    match outcome {
        WorkflowOutcome::Confirmed => display::success(message),
        other => display::error(&format!("workflow ended as {:?}", other)),
    }
}

fn print_supply_state(chain: &Arc<SimulatedChain>, owner: Address) {
    let c = *chain.contracts();
    display::amount("wstETH left", chain.balance_of(c.supply_asset, owner));
    display::amount("supplied", chain.supplied_of(c.supply_asset, owner));
    display::amount("pool allowance", chain.allowance_of(c.supply_asset, owner, c.pool));
}

async fn print_stake_state(block: &BlockController, chain: &Arc<SimulatedChain>, owner: Address) {
    let c = *chain.contracts();
    display::amount("ETH left", chain.native_balance_of(owner));
    display::amount("stETH", chain.balance_of(c.steth, owner));
    display::amount("wstETH", chain.balance_of(c.wsteth, owner));
    let view = block.view().await;
    if let PanelData::Stake(panel) = view.panel {
        display::kv("APR", &format!("{:.2}%", panel.apr));
    }
    display::info(&format!("block refreshed {} times", view.refresh_count));
}
