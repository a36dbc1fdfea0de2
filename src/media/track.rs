//! Single-source track: the play/pause/seek state machine wrapped around one
//! [`MediaElement`].
//!
//! States: `Idle -> Loading -> Ready <-> Playing <-> Paused`, plus `Ended`
//! for non-looping sources (left again by `play`/`restart`).

use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use super::element::{ElementEvent, MediaElement, PlayRejection, PlayTicket};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TrackState {
    Idle,
    Loading,
    Ready,
    Playing,
    Paused,
    Ended,
}

/// What a track reports to its owner after draining its element.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackEvent {
    /// Duration became known.
    Ready(Duration),
    CanPlayThrough,
    /// Elapsed fraction in `[0, 1]`.
    Progress(f32),
    /// Played through to the end. Emitted once per playthrough, never when looping.
    Ended,
    /// The current play request was refused; the track is paused again.
    Rejected(PlayRejection),
    Failed(String),
}

pub struct MediaTrack {
    element: Box<dyn MediaElement>,
    source: Option<PathBuf>,
    state: TrackState,
    looping: bool,
    duration: Option<Duration>,
    next_ticket: u64,
    pending: Option<PlayTicket>,
    can_play_through: bool,
    failed: bool,
}

impl MediaTrack {
    pub fn new(mut element: Box<dyn MediaElement>, looping: bool) -> Self {
        element.set_looping(looping);
        Self {
            element,
            source: None,
            state: TrackState::Idle,
            looping,
            duration: None,
            next_ticket: 0,
            pending: None,
            can_play_through: false,
            failed: false,
        }
    }

    /// Point the track at `path`. Playback stops and any pending play request
    /// is forgotten.
    pub fn load(&mut self, path: &Path) {
        self.pending = None;
        self.element.pause();
        self.element.set_source(path);
        self.source = Some(path.to_path_buf());
        self.state = TrackState::Loading;
        self.duration = self.element.duration();
        self.can_play_through = false;
        self.failed = false;
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Request playback. The outcome arrives through `pump`; until then the
    /// track counts as playing. Returns `None` when there is nothing to play.
    pub fn play(&mut self) -> Option<PlayTicket> {
        if self.source.is_none() {
            debug!("play requested on a track without source");
            return None;
        }
        if self.state == TrackState::Ended {
            self.element.seek(Duration::ZERO);
        }

        self.next_ticket += 1;
        let ticket = PlayTicket(self.next_ticket);
        self.pending = Some(ticket);
        self.state = TrackState::Playing;
        self.element.request_play(ticket);
        Some(ticket)
    }

    /// Pause synchronously. Idempotent; invalidates any pending play request.
    pub fn pause(&mut self) {
        self.pending = None;
        self.element.pause();
        if self.state == TrackState::Playing {
            self.state = TrackState::Paused;
        }
    }

    /// Pause and rewind to the start.
    pub fn stop(&mut self) {
        self.pause();
        self.element.seek(Duration::ZERO);
        if self.state == TrackState::Ended {
            self.state = TrackState::Paused;
        }
    }

    /// Rewind to the start and play.
    pub fn restart(&mut self) -> Option<PlayTicket> {
        self.seek_to(0.0);
        self.play()
    }

    /// Seek to `seconds`, clamped to `[0, duration]`.
    pub fn seek_to(&mut self, seconds: f64) {
        let mut secs = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
        if let Some(d) = self.duration {
            secs = secs.min(d.as_secs_f64());
        }
        let target = Duration::from_secs_f64(secs);
        self.element.seek(target);

        if self.state == TrackState::Ended && self.duration.is_none_or(|d| target < d) {
            self.state = TrackState::Paused;
        }
    }

    /// Set volume, clamped to `[0, 1]`.
    pub fn set_volume(&mut self, volume: f32) {
        let v = if volume.is_nan() { 0.0 } else { volume.clamp(0.0, 1.0) };
        self.element.set_volume(v);
    }

    pub fn volume(&self) -> f32 {
        self.element.volume()
    }

    pub fn state(&self) -> TrackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == TrackState::Playing
    }

    /// Whether the element reported it can play through without stalling.
    pub fn can_play_through(&self) -> bool {
        self.can_play_through
    }

    /// Whether the source failed to open or decode.
    pub fn has_failed(&self) -> bool {
        self.failed
    }

    pub fn position(&self) -> Duration {
        self.element.position()
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration.or_else(|| self.element.duration())
    }

    /// Elapsed fraction in `[0, 1]`; `0` while the duration is unknown.
    pub fn progress(&self) -> f32 {
        match self.duration() {
            Some(d) if !d.is_zero() => {
                (self.position().as_secs_f64() / d.as_secs_f64()).clamp(0.0, 1.0) as f32
            }
            _ => 0.0,
        }
    }

    /// The play request still waiting for its outcome, if any.
    pub fn pending_play(&self) -> Option<PlayTicket> {
        self.pending
    }

    /// Drain element events into track events, applying the stale-ticket guard.
    pub fn pump(&mut self) -> Vec<TrackEvent> {
        let mut out = Vec::new();

        for ev in self.element.poll() {
            match ev {
                ElementEvent::MetadataLoaded(d) => {
                    self.duration = Some(d);
                    if self.state == TrackState::Loading {
                        self.state = TrackState::Ready;
                    }
                    out.push(TrackEvent::Ready(d));
                }
                ElementEvent::CanPlayThrough => {
                    self.can_play_through = true;
                    if self.state == TrackState::Loading {
                        self.state = TrackState::Ready;
                    }
                    out.push(TrackEvent::CanPlayThrough);
                }
                ElementEvent::TimeUpdate(pos) => {
                    if self.state != TrackState::Playing {
                        continue;
                    }
                    if let Some(d) = self.duration().filter(|d| !d.is_zero()) {
                        let fraction =
                            (pos.as_secs_f64() / d.as_secs_f64()).clamp(0.0, 1.0) as f32;
                        out.push(TrackEvent::Progress(fraction));
                    }
                }
                ElementEvent::Ended => {
                    if self.looping || self.state != TrackState::Playing {
                        continue;
                    }
                    self.state = TrackState::Ended;
                    self.pending = None;
                    out.push(TrackEvent::Ended);
                }
                ElementEvent::PlaySettled { ticket, outcome } => {
                    if self.pending != Some(ticket) {
                        // Superseded by a pause, reload or newer request.
                        debug!(ticket = ticket.0, "ignoring stale play outcome");
                        if outcome.is_ok() && self.state != TrackState::Playing {
                            self.element.pause();
                        }
                        continue;
                    }
                    self.pending = None;
                    if let Err(reason) = outcome {
                        debug!(%reason, "play request rejected");
                        self.element.pause();
                        self.state = TrackState::Paused;
                        out.push(TrackEvent::Rejected(reason));
                    }
                }
                ElementEvent::Failed(msg) => {
                    warn!(source = ?self.source, "media failed: {msg}");
                    self.failed = true;
                    out.push(TrackEvent::Failed(msg));
                }
            }
        }

        out
    }

    /// Ramp the volume down over `total` in `steps`, then pause and restore
    /// the volume. Blocks the caller for the length of the fade.
    pub fn fade_out(&mut self, total: Duration, steps: u64) {
        if !self.is_playing() {
            return;
        }
        let start = self.volume();
        if !total.is_zero() {
            let steps = steps.max(1);
            let step_dur = (total / steps as u32).max(Duration::from_millis(1));
            for step in 1..=steps {
                let t = step as f32 / steps as f32;
                self.element.set_volume(start * (1.0 - t));
                thread::sleep(step_dur);
            }
        }
        self.pause();
        self.element.set_volume(start);
    }
}
