//! Selection engine command model.
//!
//! Every primitive of the [`SelectionEngine`] is mirrored by an
//! [`EngineCommand`] variant so that command sequences can be planned as
//! plain data, recorded by test doubles and shipped to a worker thread.

use std::fmt;

use crate::engine::SelectionEngine;
use crate::error::EngineError;
use crate::palette::Rgb;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How a color selection combines with the ambient selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum SelectOp {
    /// Union the matched points into the selection.
    Add,
    /// Remove the matched points from the selection.
    Remove,
}

impl fmt::Display for SelectOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectOp::Add => write!(f, "ADD"),
            SelectOp::Remove => write!(f, "REMOVE"),
        }
    }
}

/// A single selection engine operation with its arguments.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "command", rename_all = "camelCase"))]
pub enum EngineCommand {
    UnhideAll,
    ClearSelection,
    SelectByColor {
        op: SelectOp,
        color: Rgb,
        threshold: f32,
    },
    InvertSelection,
    HideSelected,
    SelectVisibleOnlySubset,
}

impl EngineCommand {
    /// Dispatches this command to `engine`.
    ///
    /// # Errors
    /// Propagates the engine's failure unchanged.
    pub fn apply<E: SelectionEngine + ?Sized>(&self, engine: &mut E) -> Result<(), EngineError> {
        match *self {
            EngineCommand::UnhideAll => engine.unhide_all(),
            EngineCommand::ClearSelection => engine.clear_selection(),
            EngineCommand::SelectByColor {
                op,
                color,
                threshold,
            } => engine.select_by_color(op, color, threshold),
            EngineCommand::InvertSelection => engine.invert_selection(),
            EngineCommand::HideSelected => engine.hide_selected(),
            EngineCommand::SelectVisibleOnlySubset => engine.select_visible_only_subset(),
        }
    }

    /// Stable operation name.
    pub fn name(&self) -> &'static str {
        match self {
            EngineCommand::UnhideAll => "unhideAll",
            EngineCommand::ClearSelection => "clearSelection",
            EngineCommand::SelectByColor { .. } => "selectByColor",
            EngineCommand::InvertSelection => "invertSelection",
            EngineCommand::HideSelected => "hideSelected",
            EngineCommand::SelectVisibleOnlySubset => "selectVisibleOnlySubset",
        }
    }

    /// Shorthand for an additive color selection.
    pub fn add_color(color: Rgb, threshold: f32) -> Self {
        EngineCommand::SelectByColor {
            op: SelectOp::Add,
            color,
            threshold,
        }
    }
}

impl fmt::Display for EngineCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineCommand::SelectByColor {
                op,
                color,
                threshold,
            } => write!(f, "selectByColor({op}, {color}, {threshold})"),
            other => f.write_str(other.name()),
        }
    }
}
