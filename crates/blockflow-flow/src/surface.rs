//! The authoritative list of placed blocks

use blockflow_types::{BlockId, BlockIdGenerator, BlockInstance, BlockKind, Position};

/// Ordered list of blocks on the canvas.
///
/// Insertion order is preserved across moves. Ids come from a monotonic
/// generator, so a removed id is never handed out again.
#[derive(Debug, Clone, Default)]
pub struct FlowSurface {
    blocks: Vec<BlockInstance>,
    ids: BlockIdGenerator,
}

impl FlowSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new block of `kind` at the origin
    pub fn add_block(&mut self, kind: BlockKind) -> BlockInstance {
        let block = BlockInstance::new(self.ids.next_id(), kind);
        self.blocks.push(block);
        block
    }

    /// Remove the block with `id`, returning it if it was present
    pub fn remove_block(&mut self, id: BlockId) -> Option<BlockInstance> {
        let index = self.blocks.iter().position(|b| b.id == id)?;
        Some(self.blocks.remove(index))
    }

    /// Replace the position of `id`; returns false if there is no such block
    pub fn move_block(&mut self, id: BlockId, position: Position) -> bool {
        match self.blocks.iter_mut().find(|b| b.id == id) {
            Some(block) => {
                block.position = position;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: BlockId) -> Option<&BlockInstance> {
        self.blocks.iter().find(|b| b.id == id)
    }

    /// Blocks in insertion order
    pub fn blocks(&self) -> &[BlockInstance] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_places_at_origin_with_unique_ids() {
        let mut surface = FlowSurface::new();
        let a = surface.add_block(BlockKind::AaveSupply);
        let b = surface.add_block(BlockKind::AaveSupply);
        assert_ne!(a.id, b.id);
        assert_eq!(a.position, Position::ORIGIN);
        assert_eq!(surface.len(), 2);
    }

    #[test]
    fn test_remove_keeps_order_and_positions() {
        let mut surface = FlowSurface::new();
        let ids: Vec<_> = (0..4).map(|_| surface.add_block(BlockKind::LidoStake).id).collect();
        surface.move_block(ids[3], Position::new(100, 40));

        let removed = surface.remove_block(ids[1]).unwrap();
        assert_eq!(removed.id, ids[1]);
        let remaining: Vec<_> = surface.blocks().iter().map(|b| b.id).collect();
        assert_eq!(remaining, vec![ids[0], ids[2], ids[3]]);
        assert_eq!(surface.get(ids[3]).unwrap().position, Position::new(100, 40));

        assert!(surface.remove_block(ids[1]).is_none());
        assert_eq!(surface.len(), 3);
    }

    #[test]
    fn test_move_unknown_is_noop() {
        let mut surface = FlowSurface::new();
        surface.add_block(BlockKind::AaveSupply);
        let before = surface.blocks().to_vec();
        assert!(!surface.move_block(BlockId(-1), Position::new(20, 20)));
        assert_eq!(surface.blocks(), &before[..]);
    }

    #[test]
    fn test_ids_not_reused_after_removal() {
        let mut surface = FlowSurface::new();
        let first = surface.add_block(BlockKind::AaveSupply);
        surface.remove_block(first.id);
        let second = surface.add_block(BlockKind::AaveSupply);
        assert!(second.id > first.id);
    }
}
