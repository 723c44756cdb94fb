/// Ownership state of one pooled playback buffer.
///
/// State transitions:
/// ```text
/// free ──push──▶ queued ──device reports processed──▶ free
/// ```
/// "Reclaimed" is the instant a queued buffer is unqueued; it lands in
/// `Free` in the same step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferState {
    Free,
    Queued,
}

impl BufferState {
    pub fn is_free(&self) -> bool {
        matches!(self, Self::Free)
    }

    pub fn is_queued(&self) -> bool {
        matches!(self, Self::Queued)
    }
}

/// Play state reported by a playback device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlayState {
    #[default]
    Initial,
    Playing,
    Paused,
    Stopped,
}

impl PlayState {
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing)
    }
}
