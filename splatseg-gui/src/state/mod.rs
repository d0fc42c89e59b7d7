//! Application state modules.

mod status;
mod transform;
mod ui;

pub use status::StatusState;
pub use transform::TransformState;
pub use ui::UiState;
