//! Canvas drop target and grid snapping
//!
//! A drop carries the dragged block's id, where the drag started and the
//! accumulated pixel delta. Each axis of the new position is
//! `round((start + delta) / 20) * 20`, rounding exact ties toward positive
//! infinity: 10 → 20, -10 → 0, -30 → -20. Positions are not clamped.

use blockflow_types::{BlockId, Position, GRID_UNIT};
use serde::{Deserialize, Serialize};

use crate::error::{FlowError, FlowResult};
use crate::surface::FlowSurface;

/// A finished drag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropEvent {
    pub id: BlockId,
    pub start: Position,
    pub delta: Position,
}

/// Snap one axis to the grid
pub fn snap_axis(value: i64) -> i64 {
    value.saturating_add(GRID_UNIT / 2).div_euclid(GRID_UNIT) * GRID_UNIT
}

/// Grid-snapping drop target
#[derive(Debug, Clone, Copy, Default)]
pub struct Canvas;

impl Canvas {
    /// Snapped position for a drag from `start` by `delta`
    pub fn snap(start: Position, delta: Position) -> Position {
        Position {
            x: snap_axis(start.x.saturating_add(delta.x)),
            y: snap_axis(start.y.saturating_add(delta.y)),
        }
    }

    /// Move the dropped block to its snapped position.
    ///
    /// Returns the position the block would occupy; dropping an id the
    /// surface no longer holds changes nothing.
    pub fn drop(surface: &mut FlowSurface, event: DropEvent) -> Position {
        let position = Self::snap(event.start, event.delta);
        surface.move_block(event.id, position);
        position
    }
}

/// A drag in progress.
///
/// Front ends start one when a block is picked up, feed it pointer or
/// keyboard deltas, render the block at reduced opacity while it is active
/// and finish it with [`DragSession::finish`].
#[derive(Debug, Clone, Default)]
pub struct DragSession {
    active: Option<DropEvent>,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick up `id` at `start`, replacing any unfinished drag
    pub fn start(&mut self, id: BlockId, start: Position) {
        self.active = Some(DropEvent {
            id,
            start,
            delta: Position::ORIGIN,
        });
    }

    /// Accumulate a pointer delta
    pub fn drag_by(&mut self, dx: i64, dy: i64) -> FlowResult<()> {
        let drag = self.active.as_mut().ok_or(FlowError::NoDrag)?;
        drag.delta = drag.delta.offset(Position::new(dx, dy));
        Ok(())
    }

    /// Id of the block being dragged
    pub fn dragging(&self) -> Option<BlockId> {
        self.active.map(|d| d.id)
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Unsnapped position while dragging
    pub fn preview(&self) -> Option<Position> {
        self.active.map(|d| d.start.offset(d.delta))
    }

    /// Position the block lands on if dropped now
    pub fn snapped_preview(&self) -> Option<Position> {
        self.active.map(|d| Canvas::snap(d.start, d.delta))
    }

    /// Abandon the drag without moving anything
    pub fn cancel(&mut self) {
        self.active = None;
    }

    /// End the drag and produce the drop
    pub fn finish(&mut self) -> FlowResult<DropEvent> {
        self.active.take().ok_or(FlowError::NoDrag)
    }
}
