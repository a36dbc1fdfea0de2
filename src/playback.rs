//! Playback coordination: the ambient bed, the preview grid and the showcase
//! overlay, wired together over the bus and owned by one [`Stage`].

mod ambient;
mod preview;
mod showcase;
mod stage;
mod types;

pub use stage::Stage;
pub use types::*;
