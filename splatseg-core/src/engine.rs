//! Selection engine capability interface.
//!
//! The engine owns per-point selection and hide state of the rendered splat
//! scene. This crate never touches that state directly; it only issues the
//! primitives below.

use std::sync::{Arc, Mutex};

use crate::command::{EngineCommand, SelectOp};
use crate::error::EngineError;
use crate::palette::Rgb;
use crate::{Error, Result};

/// Color-based selection and visibility primitives of a splat renderer.
pub trait SelectionEngine {
    /// Clears all hide flags scene-wide.
    fn unhide_all(&mut self) -> std::result::Result<(), EngineError>;

    /// Clears the ambient selection set (not hide state).
    fn clear_selection(&mut self) -> std::result::Result<(), EngineError>;

    /// Adds/removes points within `threshold` color distance of `color`
    /// to/from the ambient selection.
    fn select_by_color(
        &mut self,
        op: SelectOp,
        color: Rgb,
        threshold: f32,
    ) -> std::result::Result<(), EngineError>;

    /// Replaces the ambient selection with its complement over all points.
    fn invert_selection(&mut self) -> std::result::Result<(), EngineError>;

    /// Sets the hide flag on every point in the ambient selection.
    fn hide_selected(&mut self) -> std::result::Result<(), EngineError>;

    /// Replaces the ambient selection with the set of currently visible points.
    fn select_visible_only_subset(&mut self) -> std::result::Result<(), EngineError>;

    /// Applies a whole command sequence, see [`run_commands`].
    ///
    /// Engines shared with a renderer override this so readers only ever see
    /// the state before or after the sequence.
    ///
    /// # Errors
    /// Returns [`Error::EngineCommandFailed`] naming the command that failed.
    fn apply_all(&mut self, commands: &[EngineCommand]) -> Result<()> {
        run_commands(self, commands)
    }
}

impl<E: SelectionEngine + ?Sized> SelectionEngine for &mut E {
    fn unhide_all(&mut self) -> std::result::Result<(), EngineError> {
        (**self).unhide_all()
    }

    fn clear_selection(&mut self) -> std::result::Result<(), EngineError> {
        (**self).clear_selection()
    }

    fn select_by_color(
        &mut self,
        op: SelectOp,
        color: Rgb,
        threshold: f32,
    ) -> std::result::Result<(), EngineError> {
        (**self).select_by_color(op, color, threshold)
    }

    fn invert_selection(&mut self) -> std::result::Result<(), EngineError> {
        (**self).invert_selection()
    }

    fn hide_selected(&mut self) -> std::result::Result<(), EngineError> {
        (**self).hide_selected()
    }

    fn select_visible_only_subset(&mut self) -> std::result::Result<(), EngineError> {
        (**self).select_visible_only_subset()
    }

    fn apply_all(&mut self, commands: &[EngineCommand]) -> Result<()> {
        (**self).apply_all(commands)
    }
}

/// Shared engine, e.g. driven by a worker thread while a renderer reads it.
///
/// Single commands lock around themselves; [`SelectionEngine::apply_all`]
/// holds the lock for the whole sequence.
impl<E: SelectionEngine> SelectionEngine for Arc<Mutex<E>> {
    fn unhide_all(&mut self) -> std::result::Result<(), EngineError> {
        self.lock().map_err(|_| EngineError::Poisoned)?.unhide_all()
    }

    fn clear_selection(&mut self) -> std::result::Result<(), EngineError> {
        self.lock()
            .map_err(|_| EngineError::Poisoned)?
            .clear_selection()
    }

    fn select_by_color(
        &mut self,
        op: SelectOp,
        color: Rgb,
        threshold: f32,
    ) -> std::result::Result<(), EngineError> {
        self.lock()
            .map_err(|_| EngineError::Poisoned)?
            .select_by_color(op, color, threshold)
    }

    fn invert_selection(&mut self) -> std::result::Result<(), EngineError> {
        self.lock()
            .map_err(|_| EngineError::Poisoned)?
            .invert_selection()
    }

    fn hide_selected(&mut self) -> std::result::Result<(), EngineError> {
        self.lock().map_err(|_| EngineError::Poisoned)?.hide_selected()
    }

    fn select_visible_only_subset(&mut self) -> std::result::Result<(), EngineError> {
        self.lock()
            .map_err(|_| EngineError::Poisoned)?
            .select_visible_only_subset()
    }

    fn apply_all(&mut self, commands: &[EngineCommand]) -> Result<()> {
        let Some(first) = commands.first() else {
            return Ok(());
        };
        let Ok(mut engine) = self.lock() else {
            log::warn!(
                "shared engine lock poisoned; skipping {} command(s)",
                commands.len()
            );
            return Err(Error::EngineCommandFailed {
                command: *first,
                source: EngineError::Poisoned,
            });
        };
        engine.apply_all(commands)
    }
}

/// Applies `commands` to `engine` in order.
///
/// Stops at the first failing command; the commands after it are not issued.
///
/// # Errors
/// Returns [`Error::EngineCommandFailed`] naming the command that failed.
pub fn run_commands<E: SelectionEngine + ?Sized>(
    engine: &mut E,
    commands: &[EngineCommand],
) -> Result<()> {
    for (i, command) in commands.iter().enumerate() {
        log::trace!("engine <- {command}");
        if let Err(source) = command.apply(engine) {
            log::warn!(
                "{command} failed ({source}); skipping {} remaining command(s)",
                commands.len() - i - 1
            );
            return Err(Error::EngineCommandFailed {
                command: *command,
                source,
            });
        }
    }
    Ok(())
}
