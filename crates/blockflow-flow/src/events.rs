//! Flow events
//!
//! Everything observable on the canvas is broadcast to all subscribers (the
//! TUI status line, the demo printer, tests). Notifications stand in for
//! toasts.

use blockflow_types::{Address, BlockId, BlockKind, Position};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::workflow::WorkflowState;

/// Severity of a user-facing notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// Events emitted while the canvas is in use
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FlowEvent {
    /// A block was added from the palette
    BlockAdded {
        block_id: BlockId,
        kind: BlockKind,
        timestamp: DateTime<Utc>,
    },

    /// A block was removed and unmounted
    BlockRemoved {
        block_id: BlockId,
        timestamp: DateTime<Utc>,
    },

    /// A drop moved a block to a snapped position
    BlockMoved {
        block_id: BlockId,
        position: Position,
        timestamp: DateTime<Utc>,
    },

    /// Workflow state changed
    WorkflowChanged {
        block_id: BlockId,
        from: WorkflowState,
        to: WorkflowState,
        timestamp: DateTime<Utc>,
    },

    /// A transaction was signed and broadcast
    TransactionSubmitted {
        block_id: BlockId,
        method: String,
        tx_hash: String,
        timestamp: DateTime<Utc>,
    },

    /// A transaction was mined
    TransactionConfirmed {
        block_id: BlockId,
        method: String,
        tx_hash: String,
        block_number: u64,
        timestamp: DateTime<Utc>,
    },

    /// Balances and rates of a block were re-read
    BlockRefreshed {
        block_id: BlockId,
        refresh_count: u64,
        timestamp: DateTime<Utc>,
    },

    WalletConnected {
        address: Address,
        timestamp: DateTime<Utc>,
    },

    WalletDisconnected {
        timestamp: DateTime<Utc>,
    },

    /// Transient user-facing message
    Notification {
        block_id: Option<BlockId>,
        level: NotificationLevel,
        message: String,
        timestamp: DateTime<Utc>,
    },
}

impl FlowEvent {
    /// Get the timestamp of this event
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            FlowEvent::BlockAdded { timestamp, .. } => *timestamp,
            FlowEvent::BlockRemoved { timestamp, .. } => *timestamp,
            FlowEvent::BlockMoved { timestamp, .. } => *timestamp,
            FlowEvent::WorkflowChanged { timestamp, .. } => *timestamp,
            FlowEvent::TransactionSubmitted { timestamp, .. } => *timestamp,
            FlowEvent::TransactionConfirmed { timestamp, .. } => *timestamp,
            FlowEvent::BlockRefreshed { timestamp, .. } => *timestamp,
            FlowEvent::WalletConnected { timestamp, .. } => *timestamp,
            FlowEvent::WalletDisconnected { timestamp } => *timestamp,
            FlowEvent::Notification { timestamp, .. } => *timestamp,
        }
    }

    /// Block the event belongs to, if any
    pub fn block_id(&self) -> Option<BlockId> {
        match self {
            FlowEvent::BlockAdded { block_id, .. }
            | FlowEvent::BlockRemoved { block_id, .. }
            | FlowEvent::BlockMoved { block_id, .. }
            | FlowEvent::WorkflowChanged { block_id, .. }
            | FlowEvent::TransactionSubmitted { block_id, .. }
            | FlowEvent::TransactionConfirmed { block_id, .. }
            | FlowEvent::BlockRefreshed { block_id, .. } => Some(*block_id),
            FlowEvent::Notification { block_id, .. } => *block_id,
            FlowEvent::WalletConnected { .. } | FlowEvent::WalletDisconnected { .. } => None,
        }
    }

    /// Get a short description for logging
    pub fn summary(&self) -> String {
        match self {
            FlowEvent::BlockAdded { block_id, kind, .. } => {
                format!("Added {} ({})", kind, block_id)
            }
            FlowEvent::BlockRemoved { block_id, .. } => format!("Removed {}", block_id),
            FlowEvent::BlockMoved { block_id, position, .. } => {
                format!("Moved {} → {}", block_id, position)
            }
            FlowEvent::WorkflowChanged { block_id, from, to, .. } => {
                format!("{}: {} → {}", block_id, from, to)
            }
            FlowEvent::TransactionSubmitted { method, tx_hash, .. } => {
                format!("Submitted {} {}", method, short_hash(tx_hash))
            }
            FlowEvent::TransactionConfirmed { method, tx_hash, block_number, .. } => {
                format!("Confirmed {} {} in block {}", method, short_hash(tx_hash), block_number)
            }
            FlowEvent::BlockRefreshed { block_id, refresh_count, .. } => {
                format!("Refreshed {} (#{})", block_id, refresh_count)
            }
            FlowEvent::WalletConnected { address, .. } => {
                format!("Wallet connected: {}", blockflow_types::short_address(address))
            }
            FlowEvent::WalletDisconnected { .. } => "Wallet disconnected".to_string(),
            FlowEvent::Notification { level, message, .. } => match level {
                NotificationLevel::Info => message.clone(),
                NotificationLevel::Success => format!("✓ {}", message),
                NotificationLevel::Error => format!("✗ {}", message),
            },
        }
    }
}

fn short_hash(hash: &str) -> String {
    if hash.len() > 12 {
        format!("{}...", &hash[..12])
    } else {
        hash.to_string()
    }
}

/// Broadcast bus shared by the app and every block
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<FlowEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Broadcast an event
    pub fn emit(&self, event: FlowEvent) {
        tracing::trace!(event = %event.summary(), "flow event");
        // Ignore send errors (no receivers)
        let _ = self.sender.send(event);
    }

    /// Broadcast a notification
    pub fn notify(&self, block_id: Option<BlockId>, level: NotificationLevel, message: impl Into<String>) {
        self.emit(FlowEvent::Notification {
            block_id,
            level,
            message: message.into(),
            timestamp: Utc::now(),
        });
    }

    /// Subscribe to flow events
    pub fn subscribe(&self) -> broadcast::Receiver<FlowEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = FlowEvent::BlockAdded {
            block_id: BlockId(1_700_000_000_000),
            kind: BlockKind::LidoStake,
            timestamp: Utc::now(),
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"BlockAdded\""));
        assert!(json.contains("lido-stake"));

        let back: FlowEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back.summary(), event.summary());
    }

    #[test]
    fn test_notification_summary() {
        let event = FlowEvent::Notification {
            block_id: None,
            level: NotificationLevel::Error,
            message: "Transaction rejected".to_string(),
            timestamp: Utc::now(),
        };
        assert_eq!(event.summary(), "✗ Transaction rejected");
        assert_eq!(event.block_id(), None);
    }

    #[tokio::test]
    async fn test_bus_delivers_to_subscribers() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        bus.notify(Some(BlockId(3)), NotificationLevel::Success, "Supply successful");
        let event = rx.recv().await.unwrap();
        assert_eq!(event.block_id(), Some(BlockId(3)));
    }
}
