//! Flow configuration

use std::time::Duration;

use blockflow_chain::NetworkContracts;
use serde::{Deserialize, Serialize};

use crate::error::{FlowError, FlowResult};

/// Runtime configuration of the canvas and its blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowConfig {
    /// Seconds between balance/rate refreshes of a mounted block
    pub poll_secs: u64,
    /// Network whose contract addresses the blocks use
    pub network: String,
    /// Staking APR shown on stake blocks, percent
    pub stake_apr: f64,
    /// Confirmation delay of the simulated chain, milliseconds
    pub confirm_ms: u64,
    /// Label the demo signer is derived from
    pub wallet_label: String,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            poll_secs: 30,
            network: "sepolia".to_string(),
            stake_apr: 4.8,
            confirm_ms: 1500,
            wallet_label: "demo".to_string(),
        }
    }
}

impl FlowConfig {
    /// Create configuration from environment variables.
    ///
    /// Loads `.env` first when present. Unset or unparseable variables fall
    /// back to the defaults.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let mut config = Self::default();

        if let Some(secs) = env_parse::<u64>("BLOCKFLOW_POLL_SECS") {
            config.poll_secs = secs;
        }
        if let Ok(network) = std::env::var("BLOCKFLOW_NETWORK") {
            config.network = network;
        }
        if let Some(apr) = env_parse::<f64>("BLOCKFLOW_STAKE_APR") {
            config.stake_apr = apr;
        }
        if let Some(ms) = env_parse::<u64>("BLOCKFLOW_CONFIRM_MS") {
            config.confirm_ms = ms;
        }
        if let Ok(label) = std::env::var("BLOCKFLOW_WALLET_LABEL") {
            config.wallet_label = label;
        }

        config
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_secs)
    }

    pub fn confirm_delay(&self) -> Duration {
        Duration::from_millis(self.confirm_ms)
    }

    /// Contract addresses of the configured network
    pub fn contracts(&self) -> FlowResult<NetworkContracts> {
        NetworkContracts::for_network(&self.network).map_err(|e| FlowError::Config(e.to_string()))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.poll_secs == 0 {
            errors.push("poll interval must be at least one second".to_string());
        }
        if !self.stake_apr.is_finite() || self.stake_apr < 0.0 {
            errors.push(format!("staking APR must be a non-negative number, got {}", self.stake_apr));
        }
        if let Err(e) = NetworkContracts::for_network(&self.network) {
            errors.push(e.to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}
