//! BlockFlow CLI - DeFi block canvas in the terminal
//!
//! Everything runs against an in-memory simulated chain seeded with demo
//! balances, so no node or browser wallet is needed.
//!
//! # Quick Start
//!
//! ```bash
//! # Interactive canvas (default)
//! blockflow
//!
//! # Scripted supply + stake & wrap walkthrough
//! blockflow demo
//!
//! # Where would a drop land?
//! blockflow snap --x 0 --y 0 --dx 31 --dy 9
//! ```

use clap::{Parser, Subcommand};
use colored::*;
use tracing_subscriber::EnvFilter;

mod commands;
mod display;

use blockflow_flow::FlowConfig;
use commands::{demo, inspect, tui};

/// File the interactive canvas logs to
const TUI_LOG_FILE: &str = "blockflow.log";

/// BlockFlow CLI - compose DeFi actions as blocks on a canvas
#[derive(Parser)]
#[command(name = "blockflow")]
#[command(author = "BlockFlow Contributors")]
#[command(version)]
#[command(about = "Drag-and-drop DeFi blocks: supply to a lending pool, stake and wrap ETH", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Seconds between block refreshes (overrides BLOCKFLOW_POLL_SECS)
    #[arg(long, global = true)]
    poll_secs: Option<u64>,

    /// Simulated confirmation delay in ms (overrides BLOCKFLOW_CONFIRM_MS)
    #[arg(long, global = true)]
    confirm_ms: Option<u64>,

    /// Demo wallet label (overrides BLOCKFLOW_WALLET_LABEL)
    #[arg(long, global = true)]
    wallet: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive canvas
    Tui,

    /// Run the scripted supply and stake & wrap walkthrough
    Demo {
        /// Print the event log as JSON lines instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// List the block types in the palette
    Palette {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show where a block dropped with the given drag offset lands
    Snap {
        /// Block x before the drag
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        x: i64,

        /// Block y before the drag
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        y: i64,

        /// Horizontal drag offset
        #[arg(long, allow_hyphen_values = true)]
        dx: i64,

        /// Vertical drag offset
        #[arg(long, allow_hyphen_values = true)]
        dy: i64,
    },

    /// Show and validate the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut config = FlowConfig::from_env();
    if let Some(secs) = cli.poll_secs {
        config.poll_secs = secs;
    }
    if let Some(ms) = cli.confirm_ms {
        config.confirm_ms = ms;
    }
    if let Some(label) = cli.wallet {
        config.wallet_label = label;
    }
    let command = cli.command.unwrap_or(Commands::Tui);

    match command {
        Commands::Tui => {
            init_tracing(true)?;
            tui::run_tui(config).await?;
        }
        Commands::Demo { json } => {
            init_tracing(false)?;
            if !json {
                print_banner();
            }
            demo::run_demo(config, json).await?;
        }
        Commands::Palette { json } => {
            inspect::show_palette(json)?;
        }
        Commands::Snap { x, y, dx, dy } => {
            inspect::show_snap(x, y, dx, dy);
        }
        Commands::Config => {
            print_banner();
            inspect::show_config(&config)?;
        }
    }

    Ok(())
}

/// Logs go to stderr (default `warn`), or to a file (default `info`) while
/// the canvas owns the terminal
fn init_tracing(to_file: bool) -> anyhow::Result<()> {
    let default_level = if to_file { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    if to_file {
        let file = std::fs::File::create(TUI_LOG_FILE)?;
        builder
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(file))
            .init();
    } else {
        builder.with_writer(std::io::stderr).init();
    }
    Ok(())
}

fn print_banner() {
    println!();
    println!("{}", "╔══════════════════════════════════════════════════════════╗".bright_cyan());
    println!("{}{}{}",
        "║  ".bright_cyan(),
        "BlockFlow".bright_white().bold(),
        " - DeFi actions as blocks on a canvas          ║".bright_cyan()
    );
    println!("{}", "║  AAVE supply | Lido stake & wrap | simulated Sepolia     ║".bright_cyan());
    println!("{}", "╚══════════════════════════════════════════════════════════╝".bright_cyan());
    println!();
}
