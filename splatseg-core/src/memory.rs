//! In-memory reference selection engine.
//!
//! Keeps a selected flag and a hidden flag per splat. Color matching is a
//! plain normalized-RGB distance test, evaluated in parallel.

use rayon::prelude::*;

use crate::command::SelectOp;
use crate::engine::SelectionEngine;
use crate::error::EngineError;
use crate::palette::Rgb;
use crate::scene::SplatScene;

/// Selection engine over a [`SplatScene`] held in memory.
#[derive(Debug, Default)]
pub struct MemoryEngine {
    scene: Option<SplatScene>,
    selected: Vec<bool>,
    hidden: Vec<bool>,
}

impl MemoryEngine {
    /// Creates an engine with no scene; every command fails until one is loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine over `scene` with nothing selected or hidden.
    pub fn with_scene(scene: SplatScene) -> Self {
        let mut engine = Self::new();
        engine.load_scene(scene);
        engine
    }

    /// Replaces the scene, resetting selection and hide state.
    pub fn load_scene(&mut self, scene: SplatScene) {
        self.selected = vec![false; scene.len()];
        self.hidden = vec![false; scene.len()];
        self.scene = Some(scene);
    }

    /// Drops the scene.
    pub fn unload_scene(&mut self) -> Option<SplatScene> {
        self.selected.clear();
        self.hidden.clear();
        self.scene.take()
    }

    pub fn scene(&self) -> Option<&SplatScene> {
        self.scene.as_ref()
    }

    pub fn is_ready(&self) -> bool {
        self.scene.is_some()
    }

    pub fn point_count(&self) -> usize {
        self.hidden.len()
    }

    pub fn is_visible(&self, index: usize) -> bool {
        self.hidden.get(index).is_some_and(|h| !h)
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.get(index).copied().unwrap_or(false)
    }

    pub fn visible_count(&self) -> usize {
        self.hidden.iter().filter(|h| !**h).count()
    }

    pub fn selected_count(&self) -> usize {
        self.selected.iter().filter(|s| **s).count()
    }

    /// Indices of visible points, ascending.
    pub fn visible_indices(&self) -> Vec<usize> {
        self.hidden
            .iter()
            .enumerate()
            .filter_map(|(i, h)| (!h).then_some(i))
            .collect()
    }

    fn require_scene(&self) -> Result<&SplatScene, EngineError> {
        self.scene.as_ref().ok_or(EngineError::NotReady)
    }
}

impl SelectionEngine for MemoryEngine {
    fn unhide_all(&mut self) -> Result<(), EngineError> {
        self.require_scene()?;
        self.hidden.par_iter_mut().for_each(|h| *h = false);
        Ok(())
    }

    fn clear_selection(&mut self) -> Result<(), EngineError> {
        self.require_scene()?;
        self.selected.par_iter_mut().for_each(|s| *s = false);
        Ok(())
    }

    fn select_by_color(
        &mut self,
        op: SelectOp,
        color: Rgb,
        threshold: f32,
    ) -> Result<(), EngineError> {
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(EngineError::Rejected(format!(
                "threshold {threshold} out of range"
            )));
        }
        let scene = self.scene.as_ref().ok_or(EngineError::NotReady)?;
        let value = op == SelectOp::Add;
        self.selected
            .par_iter_mut()
            .zip(scene.points.par_iter())
            .filter(|(_, p)| p.color.distance(color) <= threshold)
            .for_each(|(s, _)| *s = value);
        Ok(())
    }

    fn invert_selection(&mut self) -> Result<(), EngineError> {
        self.require_scene()?;
        self.selected.par_iter_mut().for_each(|s| *s = !*s);
        Ok(())
    }

    fn hide_selected(&mut self) -> Result<(), EngineError> {
        self.require_scene()?;
        self.hidden
            .par_iter_mut()
            .zip(self.selected.par_iter())
            .for_each(|(h, s)| *h |= *s);
        Ok(())
    }

    fn select_visible_only_subset(&mut self) -> Result<(), EngineError> {
        self.require_scene()?;
        self.selected
            .par_iter_mut()
            .zip(self.hidden.par_iter())
            .for_each(|(s, h)| *s = !*h);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SplatPoint;

    const RED: Rgb = Rgb::new(255, 0, 0);
    const BLUE: Rgb = Rgb::new(0, 0, 255);

    fn scene() -> SplatScene {
        SplatScene::new(vec![
            SplatPoint::new([0.0, 0.0, 0.0], RED),
            SplatPoint::new([1.0, 0.0, 0.0], Rgb::new(240, 10, 10)),
            SplatPoint::new([2.0, 0.0, 0.0], BLUE),
            SplatPoint::new([3.0, 0.0, 0.0], Rgb::new(255, 255, 255)),
        ])
    }

    #[test]
    fn test_not_ready_without_scene() {
        let mut engine = MemoryEngine::new();
        assert_eq!(engine.unhide_all(), Err(EngineError::NotReady));
        assert_eq!(
            engine.select_by_color(SelectOp::Add, RED, 0.4),
            Err(EngineError::NotReady)
        );
    }

    #[test]
    fn test_select_by_color_threshold() {
        let mut engine = MemoryEngine::with_scene(scene());
        engine.select_by_color(SelectOp::Add, RED, 0.1).unwrap();
        assert_eq!(engine.selected_count(), 2);
        assert!(engine.is_selected(0) && engine.is_selected(1));

        engine.select_by_color(SelectOp::Remove, RED, 0.0).unwrap();
        assert!(!engine.is_selected(0));
        assert!(engine.is_selected(1));
    }

    #[test]
    fn test_invert_and_hide() {
        let mut engine = MemoryEngine::with_scene(scene());
        engine.select_by_color(SelectOp::Add, BLUE, 0.4).unwrap();
        engine.invert_selection().unwrap();
        engine.hide_selected().unwrap();
        assert_eq!(engine.visible_indices(), [2]);

        engine.unhide_all().unwrap();
        assert_eq!(engine.visible_count(), 4);
    }

    #[test]
    fn test_select_visible_only_subset() {
        let mut engine = MemoryEngine::with_scene(scene());
        engine.select_by_color(SelectOp::Add, RED, 0.4).unwrap();
        engine.hide_selected().unwrap();
        engine.select_visible_only_subset().unwrap();
        assert!(!engine.is_selected(0));
        assert!(engine.is_selected(2) && engine.is_selected(3));
    }

    #[test]
    fn test_rejects_bad_threshold() {
        let mut engine = MemoryEngine::with_scene(scene());
        assert!(matches!(
            engine.select_by_color(SelectOp::Add, RED, -1.0),
            Err(EngineError::Rejected(_))
        ));
    }
}
