//! Command sequences issued against the selection engine.
//!
//! Recomputation always rebuilds visibility from the full selection state:
//! it starts from an unhidden, unselected baseline and never adjusts hide
//! state incrementally. The result depends only on the current set of active
//! labels, not on the order or number of toggles that produced it.

use crate::command::EngineCommand;
use crate::engine::SelectionEngine;
use crate::palette::SegmentationPalette;
use crate::state::SelectionState;
use crate::Result;

/// Commands that make exactly the union of active regions visible, or
/// everything visible when no label is active.
///
/// Active labels are emitted in palette order.
pub fn recomputation_plan(
    palette: &SegmentationPalette,
    state: &SelectionState,
) -> Vec<EngineCommand> {
    let mut plan = Vec::with_capacity(state.len() + 4);
    plan.push(EngineCommand::UnhideAll);
    plan.push(EngineCommand::ClearSelection);

    if state.is_empty() {
        return plan;
    }

    plan.extend(
        state
            .indices()
            .filter_map(|i| palette.get(i))
            .map(|entry| EngineCommand::add_color(entry.color, entry.threshold)),
    );
    plan.push(EngineCommand::InvertSelection);
    plan.push(EngineCommand::HideSelected);
    plan
}

/// Hides everything outside the engine's ambient selection.
pub fn hide_unselected_plan() -> Vec<EngineCommand> {
    vec![EngineCommand::InvertSelection, EngineCommand::HideSelected]
}

/// Replaces the ambient selection with the visible points.
pub fn select_visible_only_plan() -> Vec<EngineCommand> {
    vec![EngineCommand::SelectVisibleOnlySubset]
}

/// Inverts the engine's current selection and hides it.
///
/// Operates on whatever the ambient selection is; it does not consult or
/// update any controller's active labels, so its effect can diverge from
/// the segmentation toggles.
///
/// # Errors
/// Returns [`Error::EngineCommandFailed`](crate::Error::EngineCommandFailed)
/// if the engine rejects a command.
pub fn hide_unselected<E: SelectionEngine + ?Sized>(engine: &mut E) -> Result<()> {
    engine.apply_all(&hide_unselected_plan())
}

/// Delegates to the engine's select-visible primitive.
///
/// # Errors
/// Returns [`Error::EngineCommandFailed`](crate::Error::EngineCommandFailed)
/// if the engine rejects the command.
pub fn select_visible_only<E: SelectionEngine + ?Sized>(engine: &mut E) -> Result<()> {
    engine.apply_all(&select_visible_only_plan())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::Rgb;
    use crate::recording::RecordingEngine;

    #[test]
    fn test_empty_plan() {
        let palette = SegmentationPalette::reference();
        let plan = recomputation_plan(&palette, &SelectionState::new());
        assert_eq!(
            plan,
            [EngineCommand::UnhideAll, EngineCommand::ClearSelection]
        );
    }

    #[test]
    fn test_plan_follows_palette_order() {
        let palette = SegmentationPalette::reference();
        let mut state = SelectionState::new();
        state.set_active(&palette, "White", true).unwrap();
        state.set_active(&palette, "Csf", true).unwrap();

        let plan = recomputation_plan(&palette, &state);
        assert_eq!(
            plan,
            [
                EngineCommand::UnhideAll,
                EngineCommand::ClearSelection,
                EngineCommand::add_color(Rgb::new(0, 255, 255), 0.4),
                EngineCommand::add_color(Rgb::new(255, 255, 255), 0.4),
                EngineCommand::InvertSelection,
                EngineCommand::HideSelected,
            ]
        );
    }

    #[test]
    fn test_ambient_actions() {
        let mut engine = RecordingEngine::new();
        hide_unselected(&mut engine).unwrap();
        select_visible_only(&mut engine).unwrap();
        assert_eq!(
            engine.commands(),
            [
                EngineCommand::InvertSelection,
                EngineCommand::HideSelected,
                EngineCommand::SelectVisibleOnlySubset,
            ]
        );
    }
}
