//! The looping ambient bed.
//!
//! Two separate notions are tracked: whether the bed is logically on
//! (`wanted`) and who is currently holding it silent (`interrupters`). Audio
//! only plays when it is wanted and nobody interrupts.

use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

use tracing::{debug, info};

use super::types::Interrupter;
use crate::bus::{Signal, Subscriber};
use crate::media::{MediaElement, MediaTrack, TrackEvent};

pub struct AmbientPlayer {
    track: Option<MediaTrack>,
    wanted: bool,
    user_paused: bool,
    interrupters: BTreeSet<Interrupter>,
    // One-shot autoplay on the first gesture, until a play succeeds.
    gesture_armed: bool,
}

impl AmbientPlayer {
    /// Build the player. Without a `source` every operation is a no-op.
    pub fn new(
        element: Box<dyn MediaElement>,
        source: Option<&Path>,
        volume: f32,
        autoplay: bool,
    ) -> Self {
        let track = source.map(|path| {
            let mut track = MediaTrack::new(element, true);
            track.set_volume(volume);
            track.load(path);
            track
        });
        Self {
            gesture_armed: autoplay && track.is_some(),
            track,
            wanted: false,
            user_paused: false,
            interrupters: BTreeSet::new(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.track.is_some()
    }

    pub fn source(&self) -> Option<&Path> {
        self.track.as_ref().and_then(MediaTrack::source)
    }

    /// Logically on, audible or not.
    pub fn is_wanted(&self) -> bool {
        self.wanted
    }

    pub fn is_playing(&self) -> bool {
        self.track.as_ref().is_some_and(MediaTrack::is_playing)
    }

    pub fn is_interrupted(&self) -> bool {
        !self.interrupters.is_empty()
    }

    pub fn interrupters(&self) -> impl Iterator<Item = Interrupter> + '_ {
        self.interrupters.iter().copied()
    }

    pub fn gesture_armed(&self) -> bool {
        self.gesture_armed
    }

    /// Explicit on/off from the user.
    pub fn toggle(&mut self) {
        let Some(track) = self.track.as_mut() else {
            return;
        };
        if self.wanted {
            self.wanted = false;
            self.user_paused = true;
            track.pause();
            info!("ambient off");
        } else {
            self.wanted = true;
            self.user_paused = false;
            if self.interrupters.is_empty() {
                track.play();
            }
            info!(interrupted = !self.interrupters.is_empty(), "ambient on");
        }
    }

    /// First user interaction on the page: try autoplay once.
    pub fn on_gesture(&mut self) {
        if !self.gesture_armed || self.user_paused || self.wanted {
            return;
        }
        if !self.interrupters.is_empty() {
            return;
        }
        let Some(track) = self.track.as_mut() else {
            return;
        };
        debug!("gesture autoplay attempt");
        self.wanted = true;
        track.play();
    }

    /// Another source took the output.
    pub fn interrupt(&mut self, by: Interrupter) {
        self.interrupters.insert(by);
        if let Some(track) = self.track.as_mut().filter(|t| t.is_playing()) {
            debug!(?by, "ambient interrupted");
            track.pause();
        }
    }

    /// `by` released the output. Resumes when nobody else holds it and the
    /// bed is still wanted.
    pub fn release(&mut self, by: Interrupter) {
        self.interrupters.remove(&by);
        if !self.interrupters.is_empty() || !self.wanted {
            return;
        }
        if let Some(track) = self.track.as_mut().filter(|t| !t.is_playing()) {
            debug!(?by, "ambient resumed");
            track.play();
        }
    }

    pub fn pump(&mut self) {
        let Some(track) = self.track.as_mut() else {
            return;
        };
        for ev in track.pump() {
            if let TrackEvent::Rejected(reason) = ev {
                debug!(%reason, "ambient play refused");
                self.wanted = false;
            }
        }
        if self.gesture_armed && track.is_playing() && track.pending_play().is_none() {
            self.gesture_armed = false;
        }
    }

    pub fn fade_out(&mut self, total: Duration, steps: u64) {
        if let Some(track) = self.track.as_mut() {
            track.fade_out(total, steps);
        }
    }
}

impl Subscriber for AmbientPlayer {
    fn on_signal(&mut self, signal: Signal) {
        match signal {
            Signal::ShowcaseOpened => self.interrupt(Interrupter::Showcase),
            Signal::ShowcaseClosed => self.release(Interrupter::Showcase),
            Signal::PreviewStarted => self.interrupt(Interrupter::Preview),
            Signal::PreviewStopped => self.release(Interrupter::Preview),
        }
    }
}
