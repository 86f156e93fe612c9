//! Interactive canvas command

use std::sync::Arc;

use colored::*;

use blockflow_chain::DemoSigner;
use blockflow_flow::{FlowApp, FlowConfig};

use super::seed_demo_wallet;
use crate::display;

/// Open the canvas over a seeded simulated chain. The demo wallet starts
/// disconnected; `c` connects it.
pub async fn run_tui(config: FlowConfig) -> anyhow::Result<()> {
    if let Err(errors) = config.validate() {
        for err in &errors {
            display::error(err);
        }
        anyhow::bail!("invalid configuration");
    }

    let signer = DemoSigner::for_label(&config.wallet_label)?;
    let (app, chain) = FlowApp::simulated(config)?;
    seed_demo_wallet(&chain, signer.address());
    tracing::info!(signer = %signer.address(), "starting canvas");

    let result = blockflow_tui::run_canvas_tui(Arc::new(app), signer.address())
        .await
        .map_err(|err| {
            tracing::error!(code = err.error_code(), error = %err, "canvas aborted");
            err
        })?;

    println!(
        "{} {} blocks on the canvas, {} events, {} transactions",
        "Canvas closed:".bright_white().bold(),
        result.blocks.to_string().bright_cyan(),
        result.events_seen.to_string().bright_cyan(),
        chain.submitted_calls().len().to_string().bright_cyan()
    );
    Ok(())
}
