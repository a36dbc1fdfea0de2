//! Small shared types of the playback layer.

/// The source currently permitted to be audible. Owned by the stage and
/// recomputed after every operation; players never store it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Foreground {
    #[default]
    Idle,
    Ambient,
    Preview(usize),
    Showcase,
}

/// Who is holding the ambient bed silent.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Interrupter {
    Showcase,
    Preview,
}

/// Overlay lifecycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum OverlayState {
    #[default]
    Closed,
    Opening,
    Open,
    Closing,
}

impl OverlayState {
    /// Whether the overlay covers the page (transport usable, grid locked).
    pub fn is_shown(self) -> bool {
        matches!(self, Self::Opening | Self::Open)
    }
}
