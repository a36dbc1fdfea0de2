//! The playable element abstraction every player is built on.
//!
//! An element owns one decoded source and reports what happens to it through
//! [`ElementEvent`]s drained by `poll`. Play requests are deferred: the caller
//! hands over a [`PlayTicket`] and the element settles it in a later poll.

use std::path::Path;
use std::time::Duration;

/// Identifies one play request. Tickets are issued in increasing order by
/// the owning track; a settled ticket older than the track's current one is stale.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlayTicket(pub u64);

/// Why a play request did not start audio.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlayRejection {
    /// No source was assigned before `play`.
    #[error("no source assigned")]
    NoSource,
    /// Playback refused until the user interacts.
    #[error("playback not allowed before a user gesture")]
    Policy,
    /// The source could not be opened or decoded.
    #[error("source unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementEvent {
    /// Duration is known.
    MetadataLoaded(Duration),
    /// Enough data is buffered to play through without stalling.
    CanPlayThrough,
    /// Periodic position report while playing.
    TimeUpdate(Duration),
    /// Reached the end of a non-looping source.
    Ended,
    /// A deferred play request finished.
    PlaySettled {
        ticket: PlayTicket,
        outcome: Result<(), PlayRejection>,
    },
    /// The source failed to open or decode.
    Failed(String),
}

/// One underlying playable element (an audio or video stream).
pub trait MediaElement {
    /// Point the element at a new file. Resets position and playback.
    fn set_source(&mut self, path: &Path);
    /// Ask the element to start; the outcome arrives as `PlaySettled` with `ticket`.
    fn request_play(&mut self, ticket: PlayTicket);
    /// Pause synchronously. Idempotent.
    fn pause(&mut self);
    fn seek(&mut self, position: Duration);
    fn position(&self) -> Duration;
    fn duration(&self) -> Option<Duration>;
    fn set_volume(&mut self, volume: f32);
    fn volume(&self) -> f32;
    fn set_looping(&mut self, looping: bool);
    /// Drain pending events.
    fn poll(&mut self) -> Vec<ElementEvent>;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ElementKind {
    Audio,
    Video,
}

/// Builds elements for the players. The runtime uses the rodio factory;
/// tests use an in-memory one.
pub trait ElementFactory {
    fn create(&self, kind: ElementKind) -> Box<dyn MediaElement>;
}
