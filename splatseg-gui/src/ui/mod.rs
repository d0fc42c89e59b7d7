//! UI rendering modules.
//!
//! Contains the UI rendering logic split into separate modules:
//! - `scene_panel`: Right sidebar with scene, transform and segmentation controls
//! - `viewport`: Central panel with the splat preview

mod scene_panel;
pub mod theme;
mod viewport;
