//! The flow coordinator
//!
//! `FlowApp` owns the authoritative `FlowSurface` and keeps exactly one
//! mounted `BlockController` per listed block. Palette selections, drops and
//! removals all come through here, so the surface and the mounted set never
//! disagree for longer than one mount.

use std::collections::HashMap;
use std::sync::Arc;

use blockflow_chain::{ChainClient, ContractAdapter, NetworkContracts, SimulatedChain, WalletSession};
use blockflow_types::{Address, BlockId, BlockInstance, BlockKind, Position};
use chrono::Utc;
use parking_lot::RwLock;

use crate::block::{BlockContext, BlockController};
use crate::canvas::{Canvas, DropEvent};
use crate::config::FlowConfig;
use crate::error::FlowResult;
use crate::events::{EventBus, FlowEvent};
use crate::surface::FlowSurface;

/// Canvas, mounted blocks, wallet and event bus
pub struct FlowApp {
    config: FlowConfig,
    ctx: BlockContext,
    surface: RwLock<FlowSurface>,
    blocks: RwLock<HashMap<BlockId, Arc<BlockController>>>,
}

impl FlowApp {
    /// Create an app over any chain client
    pub fn new(config: FlowConfig, client: Arc<dyn ChainClient>) -> FlowResult<Self> {
        let contracts = config.contracts()?;
        let ctx = BlockContext {
            adapter: ContractAdapter::new(client),
            contracts,
            wallet: Arc::new(WalletSession::new()),
            events: EventBus::default(),
            poll_interval: config.poll_interval(),
            stake_apr: config.stake_apr,
        };
        tracing::info!(
            network = %config.network,
            client = ctx.adapter.client_name(),
            poll_secs = config.poll_secs,
            "flow app created"
        );
        Ok(Self {
            config,
            ctx,
            surface: RwLock::new(FlowSurface::new()),
            blocks: RwLock::new(HashMap::new()),
        })
    }

    /// Create an app over a fresh simulated chain using the configured
    /// confirmation delay
    pub fn simulated(config: FlowConfig) -> FlowResult<(Self, Arc<SimulatedChain>)> {
        let contracts = config.contracts()?;
        let chain = Arc::new(SimulatedChain::new(contracts).with_confirm_delay(config.confirm_delay()));
        let app = Self::new(config, chain.clone())?;
        Ok((app, chain))
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    pub fn contracts(&self) -> &NetworkContracts {
        &self.ctx.contracts
    }

    pub fn events(&self) -> &EventBus {
        &self.ctx.events
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<FlowEvent> {
        self.ctx.events.subscribe()
    }

    // ── Surface mutations ────────────────────────────────────────────────────

    /// Add a block of `kind` at the origin and mount it
    pub async fn add_block(&self, kind: BlockKind) -> BlockInstance {
        let instance = self.surface.write().add_block(kind);
        let controller = Arc::new(BlockController::mount(instance, self.ctx.clone()).await);

        let still_listed = self.surface.read().get(instance.id).is_some();
        if !still_listed {
            // Removed while mounting
            controller.unmount();
            return instance;
        }
        self.blocks.write().insert(instance.id, controller);

        self.ctx.events.emit(FlowEvent::BlockAdded {
            block_id: instance.id,
            kind,
            timestamp: Utc::now(),
        });
        instance
    }

    /// Remove a block and unmount it; no-op for unknown ids
    pub fn remove_block(&self, id: BlockId) -> Option<BlockInstance> {
        let removed = self.surface.write().remove_block(id)?;
        if let Some(controller) = self.blocks.write().remove(&id) {
            controller.unmount();
        }
        self.ctx.events.emit(FlowEvent::BlockRemoved {
            block_id: id,
            timestamp: Utc::now(),
        });
        Some(removed)
    }

    /// Set a block's position; no-op for unknown ids
    pub fn move_block(&self, id: BlockId, position: Position) -> bool {
        let moved = self.surface.write().move_block(id, position);
        if moved {
            self.ctx.events.emit(FlowEvent::BlockMoved {
                block_id: id,
                position,
                timestamp: Utc::now(),
            });
        }
        moved
    }

    /// Snap a drop to the grid and move the block there
    pub fn drop_block(&self, event: DropEvent) -> Position {
        let position = Canvas::snap(event.start, event.delta);
        self.move_block(event.id, position);
        position
    }

    /// Blocks in insertion order
    pub fn blocks(&self) -> Vec<BlockInstance> {
        self.surface.read().blocks().to_vec()
    }

    pub fn block(&self, id: BlockId) -> Option<Arc<BlockController>> {
        self.blocks.read().get(&id).cloned()
    }

    /// Mounted controllers in surface order
    pub fn controllers(&self) -> Vec<Arc<BlockController>> {
        let surface = self.surface.read();
        let blocks = self.blocks.read();
        surface
            .blocks()
            .iter()
            .filter_map(|b| blocks.get(&b.id).cloned())
            .collect()
    }

    // ── Wallet ───────────────────────────────────────────────────────────────

    pub fn wallet(&self) -> &Arc<WalletSession> {
        &self.ctx.wallet
    }

    /// Connect `address` and reload every block for it
    pub async fn connect_wallet(&self, address: Address) {
        self.ctx.wallet.connect(address);
        self.ctx.events.emit(FlowEvent::WalletConnected {
            address,
            timestamp: Utc::now(),
        });
        self.refresh_all().await;
    }

    pub fn disconnect_wallet(&self) {
        self.ctx.wallet.disconnect();
        self.ctx.events.emit(FlowEvent::WalletDisconnected {
            timestamp: Utc::now(),
        });
    }

    /// `"Connect Wallet"` or `"Connected: 0x1234...abcd"`
    pub fn wallet_banner(&self) -> String {
        self.ctx.wallet.banner()
    }

    /// Reload every mounted block
    pub async fn refresh_all(&self) {
        for controller in self.controllers() {
            let _ = controller.refresh().await;
        }
    }

    /// Unmount every block, leaving the surface as is
    pub fn shutdown(&self) {
        for controller in self.blocks.write().drain().map(|(_, c)| c) {
            controller.unmount();
        }
    }
}

impl std::fmt::Debug for FlowApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowApp")
            .field("network", &self.config.network)
            .field("blocks", &self.surface.read().len())
            .field("wallet", &self.ctx.wallet.address())
            .finish()
    }
}
