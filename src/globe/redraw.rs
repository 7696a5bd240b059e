//! Single-slot redraw scheduling.

/// A pending-redraw flag drained once per display refresh.
///
/// Any number of requests between two drains collapse into one redraw.
#[derive(Debug, Clone, Default)]
pub struct PendingRedraw {
    pending: bool,
}

impl PendingRedraw {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self) {
        self.pending = true;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Clears the flag, returning whether a redraw was pending.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }
}
