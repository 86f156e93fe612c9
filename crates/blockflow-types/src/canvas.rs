//! Canvas geometry, block instances and the block catalog

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::BlockId;

/// Grid unit in pixels; every dropped position is a multiple of this
pub const GRID_UNIT: i64 = 20;

/// Pixel position on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i64,
    pub y: i64,
}

impl Position {
    /// The canvas origin, where new blocks are placed
    pub const ORIGIN: Position = Position { x: 0, y: 0 };

    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Offset by a pixel delta, saturating at the `i64` range
    pub fn offset(&self, delta: Position) -> Self {
        Self {
            x: self.x.saturating_add(delta.x),
            y: self.y.saturating_add(delta.y),
        }
    }

    /// True when both axes sit on the grid
    pub fn is_on_grid(&self) -> bool {
        self.x.rem_euclid(GRID_UNIT) == 0 && self.y.rem_euclid(GRID_UNIT) == 0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Kind of DeFi action a block performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    /// Supply wstETH to the lending pool
    #[serde(rename = "aave-supply")]
    AaveSupply,
    /// Stake ETH for stETH, optionally wrapping into wstETH
    #[serde(rename = "lido-stake")]
    LidoStake,
}

impl BlockKind {
    /// Every kind, in catalog order
    pub const ALL: [BlockKind; 2] = [BlockKind::AaveSupply, BlockKind::LidoStake];

    /// Stable catalog id
    pub fn id(&self) -> &'static str {
        match self {
            Self::AaveSupply => "aave-supply",
            Self::LidoStake => "lido-stake",
        }
    }

    /// Title shown on the palette entry and the block header
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::AaveSupply => "AAVE Supply",
            Self::LidoStake => "Lido Stake & Wrap",
        }
    }

    /// Look a kind up by catalog id
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.id() == id)
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A placed block. Only `position` ever changes after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockInstance {
    pub id: BlockId,
    #[serde(rename = "type")]
    pub kind: BlockKind,
    pub position: Position,
}

impl BlockInstance {
    /// Create an instance at the canvas origin
    pub fn new(id: BlockId, kind: BlockKind) -> Self {
        Self {
            id,
            kind,
            position: Position::ORIGIN,
        }
    }
}

/// Static, read-only catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlockTypeDescriptor {
    pub id: BlockKind,
    #[serde(rename = "name")]
    pub display_name: &'static str,
}

/// The closed catalog of block types
pub const BLOCK_CATALOG: [BlockTypeDescriptor; 2] = [
    BlockTypeDescriptor {
        id: BlockKind::AaveSupply,
        display_name: "AAVE Supply",
    },
    BlockTypeDescriptor {
        id: BlockKind::LidoStake,
        display_name: "Lido Stake & Wrap",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_ids_roundtrip_through_catalog() {
        for desc in BLOCK_CATALOG {
            assert_eq!(BlockKind::from_id(desc.id.id()), Some(desc.id));
            assert_eq!(desc.id.display_name(), desc.display_name);
        }
        assert_eq!(BlockKind::from_id("uniswap-swap"), None);
    }

    #[test]
    fn test_instance_serializes_like_the_canvas_model() {
        let block = BlockInstance::new(BlockId(7), BlockKind::LidoStake);
        let json = serde_json::to_value(block).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["type"], "lido-stake");
        assert_eq!(json["position"]["x"], 0);
    }

    #[test]
    fn test_on_grid() {
        assert!(Position::new(-40, 60).is_on_grid());
        assert!(!Position::new(10, 20).is_on_grid());
        assert!(Position::ORIGIN.is_on_grid());
    }

    #[test]
    fn test_offset_saturates() {
        let edge = Position::new(i64::MAX - 5, i64::MIN + 5);
        assert_eq!(edge.offset(Position::new(100, -100)), Position::new(i64::MAX, i64::MIN));
        assert_eq!(Position::new(40, 20).offset(Position::new(-60, 5)), Position::new(-20, 25));
    }
}
