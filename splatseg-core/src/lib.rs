//! splatseg-core: Segmentation visibility control for volumetric splat scenes.
//!
//! This crate tracks which anatomical segmentation regions a user has
//! toggled on and drives an external color-based [`SelectionEngine`] so that
//! exactly the union of the active regions stays visible, or the whole
//! scene when none is active.
//!

pub mod command;
pub mod controller;
pub mod engine;
pub mod error;
pub mod memory;
pub mod palette;
pub mod protocol;
pub mod recording;
pub mod scene;
pub mod state;
pub mod worker;

pub use command::{EngineCommand, SelectOp};
pub use controller::SegmentationSelectionController;
pub use engine::{run_commands, SelectionEngine};
pub use error::{EngineError, Error, Result};
pub use memory::MemoryEngine;
pub use palette::{PaletteEntry, Rgb, SegmentationPalette, DEFAULT_THRESHOLD};
pub use protocol::{
    hide_unselected, hide_unselected_plan, recomputation_plan, select_visible_only,
    select_visible_only_plan,
};
pub use recording::{NullEngine, RecordingEngine};
pub use scene::{PhantomConfig, SceneBounds, SplatPoint, SplatScene};
pub use state::SelectionState;
pub use worker::{EngineWorker, JobKind, QueuedSelectionController, WorkerMessage};
