//! Background engine worker.
//!
//! Runs selection engine command sequences on a dedicated thread for
//! engines whose commands must not block the UI thread. Exactly one job is
//! in flight at a time. A recomputation waiting at the tail of the queue is
//! replaced by a newer one, so the latest selection state always wins and
//! stale intermediate visibility is never shown. Actions are never dropped.
//!
//! Outcomes are reported as [`WorkerMessage`]s over a channel.

use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::command::EngineCommand;
use crate::engine::SelectionEngine;
use crate::palette::SegmentationPalette;
use crate::protocol::{hide_unselected_plan, recomputation_plan, select_visible_only_plan};
use crate::state::SelectionState;
use crate::{Error, Result};

/// What a queued job does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    /// Visibility rebuild from selection state; may be superseded.
    Recompute,
    /// Ambient action (hide unselected, select visible); always runs.
    Action,
}

/// Outcome report from the worker thread.
#[derive(Debug)]
pub enum WorkerMessage {
    /// Every command of the job was applied.
    Completed { generation: u64, kind: JobKind },

    /// A command failed; the remaining commands of the job were skipped.
    Failed {
        generation: u64,
        kind: JobKind,
        error: Error,
    },

    /// A pending recomputation was replaced by a newer one before it ran.
    Superseded { generation: u64 },
}

impl WorkerMessage {
    pub fn generation(&self) -> u64 {
        match self {
            WorkerMessage::Completed { generation, .. }
            | WorkerMessage::Failed { generation, .. }
            | WorkerMessage::Superseded { generation } => *generation,
        }
    }
}

struct Job {
    generation: u64,
    kind: JobKind,
    commands: Vec<EngineCommand>,
}

#[derive(Default)]
struct Queue {
    jobs: VecDeque<Job>,
    shutdown: bool,
}

#[derive(Default)]
struct Shared {
    queue: Mutex<Queue>,
    ready: Condvar,
}

/// Owns an engine on a background thread and feeds it command sequences.
pub struct EngineWorker {
    shared: Arc<Shared>,
    tx: Sender<WorkerMessage>,
    rx: Receiver<WorkerMessage>,
    handle: Option<JoinHandle<()>>,
    next_generation: u64,
}

impl EngineWorker {
    /// Moves `engine` onto a new worker thread.
    ///
    /// # Errors
    /// Returns an I/O error if the thread cannot be spawned.
    pub fn spawn<E>(engine: E) -> Result<Self>
    where
        E: SelectionEngine + Send + 'static,
    {
        let shared = Arc::new(Shared::default());
        let (tx, rx) = channel();

        let worker_shared = Arc::clone(&shared);
        let worker_tx = tx.clone();
        let handle = thread::Builder::new()
            .name("splatseg-engine".to_string())
            .spawn(move || worker_loop(engine, &worker_shared, &worker_tx))?;
        log::info!("engine worker started");

        Ok(Self {
            shared,
            tx,
            rx,
            handle: Some(handle),
            next_generation: 1,
        })
    }

    /// Queues a visibility recomputation, replacing a recomputation still
    /// waiting at the tail of the queue.
    ///
    /// # Errors
    /// Returns [`Error::WorkerDisconnected`] if the worker has stopped.
    pub fn submit_recompute(&mut self, commands: Vec<EngineCommand>) -> Result<u64> {
        self.submit(JobKind::Recompute, commands)
    }

    /// Queues an ambient action behind everything already queued.
    ///
    /// # Errors
    /// Returns [`Error::WorkerDisconnected`] if the worker has stopped.
    pub fn submit_action(&mut self, commands: Vec<EngineCommand>) -> Result<u64> {
        self.submit(JobKind::Action, commands)
    }

    fn submit(&mut self, kind: JobKind, commands: Vec<EngineCommand>) -> Result<u64> {
        let generation = self.next_generation;
        let mut queue = self
            .shared
            .queue
            .lock()
            .map_err(|_| Error::WorkerDisconnected)?;
        if queue.shutdown || self.handle.as_ref().map_or(true, JoinHandle::is_finished) {
            return Err(Error::WorkerDisconnected);
        }

        let job = Job {
            generation,
            kind,
            commands,
        };
        match queue.jobs.back_mut() {
            Some(tail) if kind == JobKind::Recompute && tail.kind == JobKind::Recompute => {
                let stale = std::mem::replace(tail, job);
                log::warn!(
                    "recomputation #{} superseded by #{generation} before it ran",
                    stale.generation
                );
                // The receiver lives in `self`, so this cannot fail.
                let _ = self.tx.send(WorkerMessage::Superseded {
                    generation: stale.generation,
                });
            }
            _ => queue.jobs.push_back(job),
        }
        drop(queue);

        self.next_generation += 1;
        self.shared.ready.notify_one();
        Ok(generation)
    }

    /// Next outcome, if one is available.
    pub fn try_recv(&self) -> Option<WorkerMessage> {
        self.rx.try_recv().ok()
    }

    /// Waits up to `timeout` for the next outcome.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<WorkerMessage> {
        match self.rx.recv_timeout(timeout) {
            Ok(msg) => Some(msg),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Jobs queued but not yet started.
    pub fn pending_jobs(&self) -> usize {
        self.shared.queue.lock().map_or(0, |q| q.jobs.len())
    }
}

impl Drop for EngineWorker {
    fn drop(&mut self) {
        if let Ok(mut queue) = self.shared.queue.lock() {
            queue.shutdown = true;
            queue.jobs.clear();
        }
        self.shared.ready.notify_all();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("engine worker panicked");
            }
        }
        log::info!("engine worker stopped");
    }
}

fn worker_loop<E: SelectionEngine>(
    mut engine: E,
    shared: &Shared,
    tx: &Sender<WorkerMessage>,
) {
    loop {
        let job = {
            let Ok(mut queue) = shared.queue.lock() else {
                return;
            };
            loop {
                if queue.shutdown {
                    return;
                }
                if let Some(job) = queue.jobs.pop_front() {
                    break job;
                }
                queue = match shared.ready.wait(queue) {
                    Ok(queue) => queue,
                    Err(_) => return,
                };
            }
        };

        log::debug!(
            "running {:?} job #{} ({} commands)",
            job.kind,
            job.generation,
            job.commands.len()
        );
        let msg = match engine.apply_all(&job.commands) {
            Ok(()) => WorkerMessage::Completed {
                generation: job.generation,
                kind: job.kind,
            },
            Err(error) => WorkerMessage::Failed {
                generation: job.generation,
                kind: job.kind,
                error,
            },
        };
        if tx.send(msg).is_err() {
            return;
        }
    }
}

/// Segmentation controller whose recomputations run on an [`EngineWorker`].
///
/// Same contract as
/// [`SegmentationSelectionController`](crate::SegmentationSelectionController),
/// except that engine failures arrive later through
/// [`QueuedSelectionController::poll_messages`]. Selection state is updated
/// immediately on every call.
pub struct QueuedSelectionController {
    palette: SegmentationPalette,
    state: SelectionState,
    worker: EngineWorker,
}

impl QueuedSelectionController {
    pub fn new(palette: SegmentationPalette, worker: EngineWorker) -> Self {
        Self {
            palette,
            state: SelectionState::new(),
            worker,
        }
    }

    /// Spawns a worker for `engine` and wraps it.
    ///
    /// # Errors
    /// Returns an I/O error if the worker thread cannot be spawned.
    pub fn spawn<E>(palette: SegmentationPalette, engine: E) -> Result<Self>
    where
        E: SelectionEngine + Send + 'static,
    {
        Ok(Self::new(palette, EngineWorker::spawn(engine)?))
    }

    /// Activates or deactivates `label` and queues a recomputation.
    ///
    /// Returns the generation of the queued job.
    ///
    /// # Errors
    /// - [`Error::UnknownLabel`] if `label` is not in the palette.
    /// - [`Error::WorkerDisconnected`] if the worker has stopped; the state
    ///   change is kept.
    pub fn set_active(&mut self, label: &str, is_active: bool) -> Result<u64> {
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

    /// Clears every active label and queues the unhide-everything recomputation.
    ///
    /// # Errors
    /// Returns [`Error::WorkerDisconnected`] if the worker has stopped.
    pub fn reset(&mut self) -> Result<u64> {
        self.state.clear();
        self.recompute()
    }

    /// Queues a recomputation of the current state.
    ///
    /// # Errors
    /// Returns [`Error::WorkerDisconnected`] if the worker has stopped.
    pub fn recompute(&mut self) -> Result<u64> {
        let plan = recomputation_plan(&self.palette, &self.state);
        log::debug!(
            "queueing recomputation: {} active label(s), {} command(s)",
            self.state.len(),
            plan.len()
        );
        self.worker.submit_recompute(plan)
    }

    /// Queues the ambient hide-unselected action.
    ///
    /// # Errors
    /// Returns [`Error::WorkerDisconnected`] if the worker has stopped.
    pub fn hide_unselected(&mut self) -> Result<u64> {
        self.worker.submit_action(hide_unselected_plan())
    }

    /// Queues the ambient select-visible action.
    ///
    /// # Errors
    /// Returns [`Error::WorkerDisconnected`] if the worker has stopped.
    pub fn select_visible_only(&mut self) -> Result<u64> {
        self.worker.submit_action(select_visible_only_plan())
    }

    /// Drains every outcome reported so far.
    pub fn poll_messages(&self) -> Vec<WorkerMessage> {
        let messages: Vec<_> = std::iter::from_fn(|| self.worker.try_recv()).collect();
        for msg in &messages {
            if let WorkerMessage::Failed {
                generation, error, ..
            } = msg
            {
                log::warn!("job #{generation} failed: {error}");
            }
        }
        messages
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

    pub fn worker(&self) -> &EngineWorker {
        &self.worker
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::RecordingEngine;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[test]
    fn test_completes_jobs_in_order() {
        let mut worker = EngineWorker::spawn(RecordingEngine::new()).unwrap();
        let a = worker.submit_action(hide_unselected_plan()).unwrap();
        let msg = worker.recv_timeout(TIMEOUT).unwrap();
        assert!(matches!(
            msg,
            WorkerMessage::Completed { generation, kind: JobKind::Action } if generation == a
        ));

        let b = worker.submit_action(select_visible_only_plan()).unwrap();
        assert!(b > a);
        assert_eq!(worker.recv_timeout(TIMEOUT).unwrap().generation(), b);
    }

    #[test]
    fn test_reports_failure() {
        let mut engine = RecordingEngine::new();
        engine.set_ready(false);
        let mut worker = EngineWorker::spawn(engine).unwrap();
        let generation = worker
            .submit_recompute(vec![EngineCommand::UnhideAll])
            .unwrap();

        match worker.recv_timeout(TIMEOUT).unwrap() {
            WorkerMessage::Failed {
                generation: g,
                kind,
                error,
            } => {
                assert_eq!(g, generation);
                assert_eq!(kind, JobKind::Recompute);
                assert!(error.is_engine_failure());
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_queued_controller_unknown_label() {
        let mut controller = QueuedSelectionController::spawn(
            SegmentationPalette::reference(),
            RecordingEngine::new(),
        )
        .unwrap();
        assert!(matches!(
            controller.set_active("Nonexistent", true),
            Err(Error::UnknownLabel(_))
        ));
        assert!(controller.active_labels().is_empty());
        assert!(controller
            .worker()
            .recv_timeout(Duration::from_millis(50))
            .is_none());
    }

    #[test]
    fn test_queued_repeat_toggle_keeps_state_and_requeues() {
        let mut controller = QueuedSelectionController::spawn(
            SegmentationPalette::reference(),
            RecordingEngine::new(),
        )
        .unwrap();

        let first = controller.set_active("Grey", true).unwrap();
        let state = controller.state().clone();
        let second = controller.set_active("Grey", true).unwrap();

        assert!(second > first);
        assert_eq!(controller.state(), &state);
        assert_eq!(controller.active_labels(), ["Grey"]);

        let mut seen = Vec::new();
        while seen.last() != Some(&second) {
            let msg = controller.worker().recv_timeout(TIMEOUT).unwrap();
            assert!(!matches!(msg, WorkerMessage::Failed { .. }), "{msg:?}");
            seen.push(msg.generation());
        }
    }
}
