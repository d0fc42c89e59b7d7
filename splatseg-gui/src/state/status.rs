//! Status of background scene loading and engine jobs.

/// Tracks outstanding work and the user-facing status line.
pub struct StatusState {
    /// Whether a scene import is in progress.
    pub is_loading: bool,
    /// Generation of the newest engine job submitted, until it reports back.
    pub pending_generation: Option<u64>,
    /// Last engine or import failure, shown until the next success.
    pub last_error: Option<String>,
    /// User-facing status message.
    pub status_text: String,
}

impl StatusState {
    /// Marks `generation` as the newest job in flight.
    pub fn submitted(&mut self, generation: u64) {
        self.pending_generation = Some(generation);
    }

    /// Clears the pending marker once `generation` (or a newer job) reports.
    pub fn settled(&mut self, generation: u64) {
        if self.pending_generation.is_some_and(|g| generation >= g) {
            self.pending_generation = None;
        }
    }

    pub fn is_busy(&self) -> bool {
        self.is_loading || self.pending_generation.is_some()
    }
}

impl Default for StatusState {
    fn default() -> Self {
        Self {
            is_loading: false,
            pending_generation: None,
            last_error: None,
            status_text: "Ready".to_string(),
        }
    }
}
