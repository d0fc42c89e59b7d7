//! Synchronous segmentation selection controller.

use crate::engine::SelectionEngine;
use crate::palette::SegmentationPalette;
use crate::protocol::{self, recomputation_plan};
use crate::state::SelectionState;
use crate::{Error, Result};

/// Tracks active segmentation labels and keeps the engine's visible set
/// equal to the union of their regions.
///
/// Every state change runs a full recomputation to completion before
/// returning. If an engine command fails, the selection state still holds
/// the requested change, so the next successful recomputation restores the
/// correct visible set.
#[derive(Debug)]
pub struct SegmentationSelectionController<E> {
    palette: SegmentationPalette,
    state: SelectionState,
    engine: E,
}

impl<E: SelectionEngine> SegmentationSelectionController<E> {
    /// Creates a controller with no active labels.
    ///
    /// No command is sent to the engine until the first state change.
    pub fn new(palette: SegmentationPalette, engine: E) -> Self {
        Self {
            palette,
            state: SelectionState::new(),
            engine,
        }
    }

    /// Activates or deactivates `label` and recomputes visibility.
    ///
    /// Repeating a call with the same arguments leaves the state unchanged
    /// and re-issues the same command sequence.
    ///
    /// # Errors
    /// - [`Error::UnknownLabel`] if `label` is not in the palette; state and
    ///   engine are untouched.
    /// - [`Error::EngineCommandFailed`] if the engine rejects a command; the
    ///   state change is kept.
    pub fn set_active(&mut self, label: &str, is_active: bool) -> Result<()> {
        match self.state.set_active(&self.palette, label, is_active) {
            Ok(changed) => {
                log::debug!(
                    "segmentation {label:?} -> {is_active} ({})",
                    if changed { "changed" } else { "unchanged" }
                );
            }
            Err(e) => {
                log::error!("toggle for label outside the palette: {e}");
                return Err(e);
            }
        }
        self.recompute()
    }

    /// Clears every active label and makes the whole scene visible again.
    ///
    /// # Errors
    /// Returns [`Error::EngineCommandFailed`] if the engine rejects a
    /// command; the state is cleared regardless.
    pub fn reset(&mut self) -> Result<()> {
        self.state.clear();
        self.recompute()
    }

    /// Re-issues the recomputation for the current state.
    ///
    /// # Errors
    /// Returns [`Error::EngineCommandFailed`] if the engine rejects a command.
    pub fn recompute(&mut self) -> Result<()> {
        let plan = recomputation_plan(&self.palette, &self.state);
        log::debug!(
            "recomputing visibility: {} active label(s), {} command(s)",
            self.state.len(),
            plan.len()
        );
        self.engine.apply_all(&plan)
    }

    /// Ambient hide-unselected action. See [`protocol::hide_unselected`].
    ///
    /// # Errors
    /// Returns [`Error::EngineCommandFailed`] if the engine rejects a command.
    pub fn hide_unselected(&mut self) -> Result<()> {
        protocol::hide_unselected(&mut self.engine)
    }

    /// Ambient select-visible action. See [`protocol::select_visible_only`].
    ///
    /// # Errors
    /// Returns [`Error::EngineCommandFailed`] if the engine rejects the command.
    pub fn select_visible_only(&mut self) -> Result<()> {
        protocol::select_visible_only(&mut self.engine)
    }

    /// Active labels in palette order.
    pub fn active_labels(&self) -> Vec<&str> {
        self.state.labels(&self.palette)
    }

    /// Whether `label` is currently active.
    ///
    /// # Errors
    /// Returns [`Error::UnknownLabel`] if `label` is not in the palette.
    pub fn is_active(&self, label: &str) -> Result<bool> {
        self.palette
            .index_of(label)
            .map(|i| self.state.contains_index(i))
            .ok_or_else(|| Error::UnknownLabel(label.to_string()))
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn palette(&self) -> &SegmentationPalette {
        &self.palette
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn into_engine(self) -> E {
        self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::EngineCommand;
    use crate::palette::Rgb;
    use crate::recording::RecordingEngine;

    fn controller() -> SegmentationSelectionController<RecordingEngine> {
        SegmentationSelectionController::new(
            SegmentationPalette::reference(),
            RecordingEngine::new(),
        )
    }

    #[test]
    fn test_new_issues_nothing() {
        let c = controller();
        assert!(c.engine().commands().is_empty());
        assert!(c.active_labels().is_empty());
    }

    #[test]
    fn test_set_active_recomputes() {
        let mut c = controller();
        c.set_active("Skull", true).unwrap();
        assert_eq!(c.active_labels(), ["Skull"]);
        assert!(c.is_active("Skull").unwrap());
        assert!(!c.is_active("Skin").unwrap());
        assert_eq!(
            c.engine_mut().take_commands(),
            [
                EngineCommand::UnhideAll,
                EngineCommand::ClearSelection,
                EngineCommand::add_color(Rgb::new(255, 0, 0), 0.4),
                EngineCommand::InvertSelection,
                EngineCommand::HideSelected,
            ]
        );
    }

    #[test]
    fn test_reset() {
        let mut c = controller();
        c.set_active("Grey", true).unwrap();
        c.set_active("White", true).unwrap();
        c.engine_mut().take_commands();

        c.reset().unwrap();
        assert!(c.active_labels().is_empty());
        assert_eq!(
            c.engine().commands(),
            [EngineCommand::UnhideAll, EngineCommand::ClearSelection]
        );
    }

    #[test]
    fn test_unknown_label_issues_nothing() {
        let mut c = controller();
        c.set_active("Skin", true).unwrap();
        c.engine_mut().take_commands();

        let err = c.set_active("Nonexistent", true).unwrap_err();
        assert!(matches!(err, Error::UnknownLabel(ref l) if l == "Nonexistent"));
        assert!(!err.is_engine_failure());
        assert_eq!(c.active_labels(), ["Skin"]);
        assert!(c.engine().commands().is_empty());
    }
}
