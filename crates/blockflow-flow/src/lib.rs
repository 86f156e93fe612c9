//! BlockFlow Flow - the canvas and everything placed on it
//!
//! This crate implements:
//! - `FlowSurface`, the authoritative ordered list of placed blocks
//! - `Canvas`, grid snapping of drops and keyboard/mouse drag sessions
//! - `Palette`, the closed catalog that issues add intents
//! - `WorkflowState`, the per-block transaction state machine, and the
//!   primary button it drives
//! - `BlockController`, one mounted block with its poller and workflows
//! - `FlowApp`, the coordinator tying surface, blocks, wallet and event bus
//!
//! # Data flow
//!
//! ```text
//! Palette ──add──→ FlowApp ──mount──→ BlockController ──→ ContractAdapter
//!                    ↑  ↑                   │
//! Canvas ──drop──────┘  └──remove/unmount───┘
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod canvas;
pub mod surface;
pub mod palette;
pub mod workflow;
pub mod block;
pub mod app;

pub use config::FlowConfig;
pub use error::{FlowError, FlowResult};
pub use events::{EventBus, FlowEvent, NotificationLevel};
pub use canvas::{Canvas, DragSession, DropEvent};
pub use surface::FlowSurface;
pub use palette::Palette;
pub use workflow::*;
pub use block::*;
pub use app::FlowApp;
