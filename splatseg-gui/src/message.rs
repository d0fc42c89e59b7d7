//! Application message types for async communication.
//!
//! Scene imports run on a background thread and report back to the UI
//! thread through a channel.

use splatseg_core::SplatScene;

/// Messages sent from background loaders to the UI thread.
pub enum AppMessage {
    /// Scene file parsed successfully.
    SceneLoaded { name: String, scene: SplatScene },

    /// Scene import failed.
    SceneLoadError(String),
}
