//! UI state for panel visibility and view options.

/// Panel and preview toggles.
pub struct UiState {
    /// Whether the segmentation section is expanded.
    pub show_segmentation: bool,
    /// Outline selected splats in the preview.
    pub highlight_selection: bool,
    /// Preview splat radius in points.
    pub point_size: f32,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            show_segmentation: true,
            highlight_selection: true,
            point_size: 2.5,
        }
    }
}
