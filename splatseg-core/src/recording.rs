//! Recording selection engine.
//!
//! Records every command it accepts, optionally forwarding to an inner
//! engine. Used as a test double and by the CLI to print emitted sequences.

use crate::command::{EngineCommand, SelectOp};
use crate::engine::SelectionEngine;
use crate::error::EngineError;
use crate::palette::Rgb;

/// Engine that keeps a log of the commands it has applied.
#[derive(Debug)]
pub struct RecordingEngine<E = NullEngine> {
    inner: E,
    commands: Vec<EngineCommand>,
    ready: bool,
    fail_after: Option<usize>,
}

impl RecordingEngine {
    /// Creates a ready recorder that only records.
    pub fn new() -> Self {
        Self::wrapping(NullEngine)
    }
}

impl<E: Default> Default for RecordingEngine<E> {
    fn default() -> Self {
        Self::wrapping(E::default())
    }
}

impl<E> RecordingEngine<E> {
    /// Creates a ready recorder forwarding accepted commands to `inner`.
    pub fn wrapping(inner: E) -> Self {
        Self {
            inner,
            commands: Vec::new(),
            ready: true,
            fail_after: None,
        }
    }

    /// Commands applied so far, oldest first.
    pub fn commands(&self) -> &[EngineCommand] {
        &self.commands
    }

    /// Returns and clears the command log.
    pub fn take_commands(&mut self) -> Vec<EngineCommand> {
        std::mem::take(&mut self.commands)
    }

    /// While not ready, every command fails with [`EngineError::NotReady`].
    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    /// Accept `count` more commands, then fail every command with
    /// [`EngineError::Rejected`] until [`RecordingEngine::clear_failure`].
    pub fn fail_after(&mut self, count: usize) {
        self.fail_after = Some(count);
    }

    pub fn clear_failure(&mut self) {
        self.fail_after = None;
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut E {
        &mut self.inner
    }

    pub fn into_inner(self) -> E {
        self.inner
    }
}

impl<E: SelectionEngine> RecordingEngine<E> {
    fn record(&mut self, command: EngineCommand) -> Result<(), EngineError> {
        if !self.ready {
            return Err(EngineError::NotReady);
        }
        if let Some(remaining) = self.fail_after.as_mut() {
            if *remaining == 0 {
                return Err(EngineError::Rejected(format!(
                    "injected failure at {}",
                    command.name()
                )));
            }
            *remaining -= 1;
        }
        command.apply(&mut self.inner)?;
        self.commands.push(command);
        Ok(())
    }
}

/// Engine that accepts every command and has no effect.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullEngine;

impl SelectionEngine for NullEngine {
    fn unhide_all(&mut self) -> Result<(), EngineError> {
        Ok(())
    }

    fn clear_selection(&mut self) -> Result<(), EngineError> {
        Ok(())
    }

    fn select_by_color(
        &mut self,
        _op: SelectOp,
        _color: Rgb,
        _threshold: f32,
    ) -> Result<(), EngineError> {
        Ok(())
    }

    fn invert_selection(&mut self) -> Result<(), EngineError> {
        Ok(())
    }

    fn hide_selected(&mut self) -> Result<(), EngineError> {
        Ok(())
    }

    fn select_visible_only_subset(&mut self) -> Result<(), EngineError> {
        Ok(())
    }
}

impl<E: SelectionEngine> SelectionEngine for RecordingEngine<E> {
    fn unhide_all(&mut self) -> Result<(), EngineError> {
        self.record(EngineCommand::UnhideAll)
    }

    fn clear_selection(&mut self) -> Result<(), EngineError> {
        self.record(EngineCommand::ClearSelection)
    }

    fn select_by_color(
        &mut self,
        op: SelectOp,
        color: Rgb,
        threshold: f32,
    ) -> Result<(), EngineError> {
        self.record(EngineCommand::SelectByColor {
            op,
            color,
            threshold,
        })
    }

    fn invert_selection(&mut self) -> Result<(), EngineError> {
        self.record(EngineCommand::InvertSelection)
    }

    fn hide_selected(&mut self) -> Result<(), EngineError> {
        self.record(EngineCommand::HideSelected)
    }

    fn select_visible_only_subset(&mut self) -> Result<(), EngineError> {
        self.record(EngineCommand::SelectVisibleOnlySubset)
    }
}
