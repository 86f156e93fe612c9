//! Block palette

use blockflow_types::{BlockInstance, BlockKind, BlockTypeDescriptor, BLOCK_CATALOG};

use crate::surface::FlowSurface;

/// Stateless view over the closed block catalog
#[derive(Debug, Clone, Copy, Default)]
pub struct Palette;

impl Palette {
    /// Every entry, in display order
    pub fn entries() -> &'static [BlockTypeDescriptor] {
        &BLOCK_CATALOG
    }

    /// Entry at `index`, wrapping around
    pub fn entry_at(index: usize) -> BlockTypeDescriptor {
        BLOCK_CATALOG[index % BLOCK_CATALOG.len()]
    }

    /// Look an entry up by its catalog id
    pub fn find(id: &str) -> Option<BlockTypeDescriptor> {
        let kind = BlockKind::from_id(id)?;
        BLOCK_CATALOG.iter().copied().find(|d| d.id == kind)
    }

    /// Selecting an entry adds a block of that type
    pub fn select(surface: &mut FlowSurface, entry: &BlockTypeDescriptor) -> BlockInstance {
        surface.add_block(entry.id)
    }
}
