//! Offline commands: palette, snapping and configuration

use colored::*;

use blockflow_flow::{Canvas, FlowConfig, Palette};
use blockflow_types::{Position, GRID_UNIT};

use crate::display;

pub fn show_palette(json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(Palette::entries())?);
        return Ok(());
    }

    println!("{}", "Block Palette".bright_white().bold());
    println!("{}", "─".repeat(40));
    for (idx, entry) in Palette::entries().iter().enumerate() {
        println!(
            "  {} {:<20} {}",
            format!("{}.", idx + 1).bright_black(),
            entry.display_name.bright_cyan(),
            entry.id.id().bright_black()
        );
    }
    Ok(())
}

pub fn show_snap(x: i64, y: i64, dx: i64, dy: i64) {
    let start = Position::new(x, y);
    let delta = Position::new(dx, dy);
    let landed = Canvas::snap(start, delta);

    println!("{}", format!("Drop on a {}px grid", GRID_UNIT).bright_white().bold());
    println!("{}", "─".repeat(40));
    display::kv("start", &start.to_string());
    display::kv("drag", &delta.to_string());
    display::kv("raw", &start.offset(delta).to_string());
    display::kv("lands at", &landed.to_string());
}

pub fn show_config(config: &FlowConfig) -> anyhow::Result<()> {
    display::section("Configuration");
    display::kv("network", &config.network);
    display::kv("poll interval", &format!("{}s", config.poll_secs));
    display::kv("staking APR", &format!("{:.2}%", config.stake_apr));
    display::kv("confirmation delay", &format!("{}ms", config.confirm_ms));
    display::kv("wallet label", &config.wallet_label);

    match config.validate() {
        Ok(()) => {
            let contracts = config.contracts()?;
            display::section("Contracts");
            display::kv("chain id", &contracts.chain_id.to_string());
            display::kv("lending pool", &contracts.pool.to_string());
            display::kv("supply asset", &contracts.supply_asset.to_string());
            display::kv("stETH", &contracts.steth.to_string());
            display::kv("wstETH", &contracts.wsteth.to_string());
            println!();
            display::success("configuration is valid");
            Ok(())
        }
        Err(errors) => {
            println!();
            for err in &errors {
                display::error(err);
            }
            anyhow::bail!("{} configuration error(s)", errors.len())
        }
    }
}
