//! Media playback primitives: the element abstraction, the single-source
//! track built on it, the rodio backend and the duration cache.

pub(crate) mod clock;
mod element;
mod format;
mod metadata;
mod output;
mod probe;
mod track;

#[cfg(test)]
pub(crate) mod fake;

pub use element::*;
pub use format::*;
pub use metadata::*;
pub use output::*;
pub use probe::*;
pub use track::*;

#[cfg(test)]
mod tests;
