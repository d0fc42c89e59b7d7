//! Main application state and logic.
//!
//! Contains the `SplatsegApp` struct which owns the loaded splat scene, the
//! segmentation controller and the panel state.

use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;

use anyhow::Context as _;
use eframe::egui;

use crate::message::AppMessage;
use crate::state::{StatusState, TransformState, UiState};
use splatseg_core::{
    Error, JobKind, MemoryEngine, PhantomConfig, QueuedSelectionController, SegmentationPalette,
    SplatScene, WorkerMessage,
};

/// Name shown for the generated scene.
const PHANTOM_NAME: &str = "Head phantom";

/// Main application state.
pub struct SplatsegApp {
    /// Engine shared between the selection worker and the preview.
    pub(crate) engine: Arc<Mutex<MemoryEngine>>,
    /// Segmentation toggles, driving `engine` on a worker thread.
    pub(crate) controller: QueuedSelectionController,
    /// Display name of the loaded scene.
    pub(crate) scene_name: String,

    /// Preview transform.
    pub(crate) transform: TransformState,
    /// UI display state.
    pub(crate) ui_state: UiState,
    /// Loading and engine job status.
    pub(crate) status: StatusState,

    /// Message receiver for scene imports.
    pub(crate) rx: Receiver<AppMessage>,
    /// Message sender for scene imports.
    pub(crate) tx: Sender<AppMessage>,
}

impl SplatsegApp {
    /// Builds the app with the reference palette and a generated phantom.
    pub fn new() -> anyhow::Result<Self> {
        let palette = SegmentationPalette::reference();
        let scene = SplatScene::phantom(&palette, &PhantomConfig::default());
        let engine = Arc::new(Mutex::new(MemoryEngine::with_scene(scene)));
        let controller = QueuedSelectionController::spawn(palette, Arc::clone(&engine))
            .context("failed to start selection engine worker")?;
        let (tx, rx) = channel();

        Ok(Self {
            engine,
            controller,
            scene_name: PHANTOM_NAME.to_string(),
            transform: TransformState::default(),
            ui_state: UiState::default(),
            status: StatusState::default(),
            rx,
            tx,
        })
    }

    /// Locks the shared engine for reading.
    pub(crate) fn engine(&self) -> Option<MutexGuard<'_, MemoryEngine>> {
        self.engine.lock().ok()
    }

    /// Import a scene file asynchronously.
    pub fn import_scene(&mut self, path: PathBuf) {
        self.status.is_loading = true;
        self.status.status_text = format!("Loading {}...", path.display());

        let tx = self.tx.clone();
        thread::spawn(move || {
            let name = path.file_stem().map_or_else(
                || path.display().to_string(),
                |s| s.to_string_lossy().into_owned(),
            );
            let msg = match SplatScene::load_json(&path) {
                Ok(scene) => AppMessage::SceneLoaded { name, scene },
                Err(e) => AppMessage::SceneLoadError(format!("{}: {e}", path.display())),
            };
            // Receiver dropped means the app is closing.
            let _ = tx.send(msg);
        });
    }

    /// Replace the scene with a freshly generated phantom.
    pub fn new_scene(&mut self) {
        let scene = SplatScene::phantom(self.controller.palette(), &PhantomConfig::default());
        self.install_scene(PHANTOM_NAME.to_string(), scene);
    }

    /// Loads `scene` into the engine and reapplies the active labels to it.
    fn install_scene(&mut self, name: String, scene: SplatScene) {
        let count = scene.len();
        let loaded = match self.engine.lock() {
            Ok(mut engine) => {
                engine.load_scene(scene);
                true
            }
            Err(_) => false,
        };
        if !loaded {
            self.report_error("engine lock poisoned; scene not loaded".to_string());
            return;
        }
        log::info!("scene {name:?} installed ({count} points)");
        self.scene_name = name;
        self.transform.reset();
        self.status.status_text = format!("Loaded {count} splats");
        self.status.last_error = None;

        let submitted = self.controller.recompute();
        self.track(submitted);
    }

    /// Segmentation checkbox handler.
    pub fn toggle_segmentation(&mut self, label: &str, active: bool) {
        match self.controller.set_active(label, active) {
            Ok(generation) => self.status.submitted(generation),
            Err(e @ Error::UnknownLabel(_)) => {
                // Checkboxes are generated from the palette.
                debug_assert!(false, "segmentation toggle wired to {e}");
                log::error!("ignoring toggle: {e}");
            }
            Err(e) => self.report_error(e.to_string()),
        }
    }

    /// Hide-unselected button handler.
    pub fn hide_unselected(&mut self) {
        let submitted = self.controller.hide_unselected();
        self.track(submitted);
    }

    /// Select-visible button handler.
    pub fn select_visible_only(&mut self) {
        let submitted = self.controller.select_visible_only();
        self.track(submitted);
    }

    /// Clears every segmentation toggle.
    pub fn reset_segmentation(&mut self) {
        let submitted = self.controller.reset();
        self.track(submitted);
    }

    /// Re-runs the recomputation after an engine failure.
    pub fn retry_recompute(&mut self) {
        let submitted = self.controller.recompute();
        self.track(submitted);
    }

    fn track(&mut self, submitted: splatseg_core::Result<u64>) {
        match submitted {
            Ok(generation) => self.status.submitted(generation),
            Err(e) => self.report_error(e.to_string()),
        }
    }

    fn report_error(&mut self, message: String) {
        log::warn!("{message}");
        self.status.status_text = "Error".to_string();
        self.status.last_error = Some(message);
    }

    /// Handle pending messages from the loader and the engine worker.
    pub fn handle_messages(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            self.status.is_loading = false;
            match msg {
                AppMessage::SceneLoaded { name, scene } => self.install_scene(name, scene),
                AppMessage::SceneLoadError(e) => self.report_error(e),
            }
        }

        for msg in self.controller.poll_messages() {
            self.status.settled(msg.generation());
            match msg {
                WorkerMessage::Completed { kind, .. } => {
                    self.status.last_error = None;
                    let (visible, total) = self
                        .engine()
                        .map_or((0, 0), |e| (e.visible_count(), e.point_count()));
                    self.status.status_text = match kind {
                        JobKind::Recompute => format!("Showing {visible} of {total} splats"),
                        JobKind::Action => format!("Applied ({visible} of {total} visible)"),
                    };
                }
                WorkerMessage::Failed { error, .. } => self.report_error(error.to_string()),
                WorkerMessage::Superseded { .. } => {}
            }
        }
    }
}

impl eframe::App for SplatsegApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_messages();
        self.render_scene_panel(ctx);
        self.render_viewport(ctx);

        if self.status.is_busy() {
            ctx.request_repaint();
        }
    }
}
