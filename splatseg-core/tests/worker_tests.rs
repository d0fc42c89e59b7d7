use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use splatseg_core::{
    hide_unselected_plan, EngineCommand, EngineError, EngineWorker, Error, JobKind, MemoryEngine,
    PhantomConfig, QueuedSelectionController, Rgb, SegmentationPalette, SelectOp,
    SelectionEngine, SplatScene, WorkerMessage,
};

const TIMEOUT: Duration = Duration::from_secs(5);

/// Engine that announces each `unhideAll` and then blocks until released,
/// holding its job in flight.
struct GatedEngine {
    log: Arc<Mutex<Vec<EngineCommand>>>,
    started: Sender<()>,
    release: Receiver<()>,
}

impl GatedEngine {
    fn push(&self, command: EngineCommand) {
        self.log.lock().unwrap().push(command);
    }
}

impl SelectionEngine for GatedEngine {
    fn unhide_all(&mut self) -> Result<(), EngineError> {
        self.push(EngineCommand::UnhideAll);
        let _ = self.started.send(());
        let _ = self.release.recv();
        Ok(())
    }

    fn clear_selection(&mut self) -> Result<(), EngineError> {
        self.push(EngineCommand::ClearSelection);
        Ok(())
    }

    fn select_by_color(
        &mut self,
        op: SelectOp,
        color: Rgb,
        threshold: f32,
    ) -> Result<(), EngineError> {
        self.push(EngineCommand::SelectByColor {
            op,
            color,
            threshold,
        });
        Ok(())
    }

    fn invert_selection(&mut self) -> Result<(), EngineError> {
        self.push(EngineCommand::InvertSelection);
        Ok(())
    }

    fn hide_selected(&mut self) -> Result<(), EngineError> {
        self.push(EngineCommand::HideSelected);
        Ok(())
    }

    fn select_visible_only_subset(&mut self) -> Result<(), EngineError> {
        self.push(EngineCommand::SelectVisibleOnlySubset);
        Ok(())
    }
}

struct Gate {
    log: Arc<Mutex<Vec<EngineCommand>>>,
    started: Receiver<()>,
    release: Sender<()>,
}

fn gated_engine() -> (GatedEngine, Gate) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let (started_tx, started_rx) = channel();
    let (release_tx, release_rx) = channel();
    (
        GatedEngine {
            log: Arc::clone(&log),
            started: started_tx,
            release: release_rx,
        },
        Gate {
            log,
            started: started_rx,
            release: release_tx,
        },
    )
}

fn recv(worker: &EngineWorker) -> WorkerMessage {
    worker.recv_timeout(TIMEOUT).expect("worker outcome")
}

#[test]
fn test_latest_recomputation_wins() {
    let (engine, gate) = gated_engine();
    let palette = SegmentationPalette::reference();
    let mut controller = QueuedSelectionController::spawn(palette, engine).unwrap();

    let first = controller.set_active("Skull", true).unwrap();
    gate.started.recv_timeout(TIMEOUT).unwrap();

    // First job is in flight; these queue up behind it and coalesce.
    let second = controller.set_active("Skin", true).unwrap();
    let third = controller.set_active("Skull", false).unwrap();
    assert_eq!(controller.worker().pending_jobs(), 1);

    let superseded = recv(controller.worker());
    assert!(matches!(superseded, WorkerMessage::Superseded { generation } if generation == second));

    gate.release.send(()).unwrap();
    gate.started.recv_timeout(TIMEOUT).unwrap();
    gate.release.send(()).unwrap();

    let done_first = recv(controller.worker());
    let done_third = recv(controller.worker());
    assert!(matches!(
        done_first,
        WorkerMessage::Completed { generation, kind: JobKind::Recompute } if generation == first
    ));
    assert!(matches!(
        done_third,
        WorkerMessage::Completed { generation, kind: JobKind::Recompute } if generation == third
    ));

    let skin = controller.palette().color_of("Skin").unwrap();
    let log = gate.log.lock().unwrap();
    let last_start = log
        .iter()
        .rposition(|c| *c == EngineCommand::UnhideAll)
        .unwrap();
    assert_eq!(
        &log[last_start..],
        [
            EngineCommand::UnhideAll,
            EngineCommand::ClearSelection,
            EngineCommand::add_color(skin, 0.4),
            EngineCommand::InvertSelection,
            EngineCommand::HideSelected,
        ]
    );
    // Exactly two recomputations reached the engine.
    assert_eq!(
        log.iter()
            .filter(|c| **c == EngineCommand::UnhideAll)
            .count(),
        2
    );
    assert_eq!(controller.active_labels(), ["Skin"]);
}

#[test]
fn test_actions_are_never_dropped() {
    let (engine, gate) = gated_engine();
    let mut worker = EngineWorker::spawn(engine).unwrap();

    let first = worker
        .submit_recompute(vec![EngineCommand::UnhideAll])
        .unwrap();
    gate.started.recv_timeout(TIMEOUT).unwrap();

    let queued = worker
        .submit_recompute(vec![EngineCommand::ClearSelection])
        .unwrap();
    let action = worker.submit_action(hide_unselected_plan()).unwrap();
    let latest = worker
        .submit_recompute(vec![EngineCommand::SelectVisibleOnlySubset])
        .unwrap();
    assert_eq!(worker.pending_jobs(), 3);

    gate.release.send(()).unwrap();

    let generations: Vec<u64> = (0..4).map(|_| recv(&worker).generation()).collect();
    assert_eq!(generations, [first, queued, action, latest]);

    assert_eq!(
        *gate.log.lock().unwrap(),
        [
            EngineCommand::UnhideAll,
            EngineCommand::ClearSelection,
            EngineCommand::InvertSelection,
            EngineCommand::HideSelected,
            EngineCommand::SelectVisibleOnlySubset,
        ]
    );
}

#[test]
fn test_queued_controller_drives_shared_engine() {
    let palette = SegmentationPalette::reference();
    let scene = SplatScene::phantom(&palette, &PhantomConfig::new().with_resolution(16));
    let skull = palette.color_of("Skull").unwrap();
    let expected = scene.iter().filter(|p| p.color == skull).count();
    let total = scene.len();

    let shared = Arc::new(Mutex::new(MemoryEngine::with_scene(scene)));
    let mut controller = QueuedSelectionController::spawn(palette, Arc::clone(&shared)).unwrap();

    controller.set_active("Skull", true).unwrap();
    let last = controller.set_active("Skull", true).unwrap();
    loop {
        let msg = recv(controller.worker());
        assert!(!matches!(msg, WorkerMessage::Failed { .. }), "{msg:?}");
        if msg.generation() == last {
            break;
        }
    }
    assert_eq!(shared.lock().unwrap().visible_count(), expected);

    let reset = controller.reset().unwrap();
    while recv(controller.worker()).generation() != reset {}
    assert_eq!(shared.lock().unwrap().visible_count(), total);
}

#[test]
fn test_queued_failures_are_reported() {
    let mut controller =
        QueuedSelectionController::spawn(SegmentationPalette::reference(), MemoryEngine::new())
            .unwrap();

    let generation = controller.set_active("Fat", true).unwrap();
    let messages = loop {
        let messages = controller.poll_messages();
        if !messages.is_empty() {
            break messages;
        }
        std::thread::sleep(Duration::from_millis(5));
    };

    assert!(matches!(
        &messages[0],
        WorkerMessage::Failed { generation: g, error, .. }
            if *g == generation && error.is_engine_failure()
    ));
    assert_eq!(controller.active_labels(), ["Fat"]);
}

#[test]
fn test_shared_engine_never_shows_partial_recomputation() {
    let palette = SegmentationPalette::reference();
    let scene = SplatScene::phantom(&palette, &PhantomConfig::new().with_resolution(24));
    let total = scene.len();
    let shared = Arc::new(Mutex::new(MemoryEngine::with_scene(scene)));
    let mut controller = QueuedSelectionController::spawn(palette, Arc::clone(&shared)).unwrap();

    let settled = controller.set_active("Skull", true).unwrap();
    while recv(controller.worker()).generation() != settled {}
    let steady = shared.lock().unwrap().visible_count();
    assert!(steady < total);

    // A renderer sampling the shared engine while identical toggles replay.
    let stop = Arc::new(AtomicBool::new(false));
    let sampler = {
        let shared = Arc::clone(&shared);
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            let mut seen = BTreeSet::new();
            while !stop.load(Ordering::Relaxed) {
                seen.insert(shared.lock().unwrap().visible_count());
                thread::yield_now();
            }
            seen
        })
    };

    let mut last = settled;
    for _ in 0..200 {
        last = controller.set_active("Skull", true).unwrap();
    }
    while recv(controller.worker()).generation() != last {}
    stop.store(true, Ordering::Relaxed);

    let seen: Vec<usize> = sampler.join().unwrap().into_iter().collect();
    assert_eq!(seen, [steady]);
}

#[test]
fn test_poisoned_shared_engine_is_reported() {
    let shared = Arc::new(Mutex::new(MemoryEngine::new()));
    let holder = Arc::clone(&shared);
    let crashed = thread::spawn(move || {
        let _guard = holder.lock().unwrap();
        panic!("renderer crashed while holding the engine");
    })
    .join();
    assert!(crashed.is_err());

    let mut controller =
        QueuedSelectionController::spawn(SegmentationPalette::reference(), Arc::clone(&shared))
            .unwrap();
    let generation = controller.set_active("Skin", true).unwrap();

    match recv(controller.worker()) {
        WorkerMessage::Failed {
            generation: g,
            error,
            ..
        } => {
            assert_eq!(g, generation);
            assert!(matches!(
                error,
                Error::EngineCommandFailed {
                    command: EngineCommand::UnhideAll,
                    source: EngineError::Poisoned,
                }
            ));
        }
        other => panic!("unexpected message: {other:?}"),
    }
    assert_eq!(controller.active_labels(), ["Skin"]);
}
