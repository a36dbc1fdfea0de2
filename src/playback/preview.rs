//! The preview grid: one shared element whose source is swapped between
//! cards, so at most one card can ever be audible.

use std::time::Duration;

use tracing::debug;

use crate::bus::{Signal, Subscriber};
use crate::catalog::PreviewItem;
use crate::media::{DurationCache, MediaElement, MediaTrack, TrackEvent};

pub struct PreviewDeck {
    items: Vec<PreviewItem>,
    track: MediaTrack,
    active: Option<usize>,
    progress: f32,
    // Paused by the overlay; resumes when it closes.
    suspended: bool,
    overlay_shown: bool,
}

impl PreviewDeck {
    pub fn new(items: Vec<PreviewItem>, element: Box<dyn MediaElement>) -> Self {
        Self {
            items,
            track: MediaTrack::new(element, false),
            active: None,
            progress: 0.0,
            suspended: false,
            overlay_shown: false,
        }
    }

    pub fn items(&self) -> &[PreviewItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The card that owns the shared element, playing or suspended.
    pub fn active(&self) -> Option<usize> {
        self.active
    }

    /// The card currently audible, if any.
    pub fn playing_index(&self) -> Option<usize> {
        self.active.filter(|_| self.track.is_playing())
    }

    pub fn is_playing(&self) -> bool {
        self.playing_index().is_some()
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Fill fraction of the active card; `0` for every other card.
    pub fn progress_of(&self, index: usize) -> f32 {
        if self.active == Some(index) {
            self.progress
        } else {
            0.0
        }
    }

    pub fn track(&self) -> &MediaTrack {
        &self.track
    }

    /// Play `index`, or stop it when it is already the active card.
    pub fn toggle(&mut self, index: usize, cache: &mut DurationCache) {
        if self.overlay_shown {
            debug!(index, "preview toggle ignored behind the overlay");
            return;
        }
        if index >= self.items.len() {
            return;
        }

        if self.active == Some(index) {
            self.stop();
            return;
        }

        self.reset_active();
        self.activate(index, cache);
        self.track.play();
    }

    /// Play `index` from the start, whatever was active before.
    pub fn restart(&mut self, index: usize, cache: &mut DurationCache) {
        if self.overlay_shown || index >= self.items.len() {
            return;
        }
        if self.active != Some(index) {
            self.reset_active();
        }
        self.activate(index, cache);
        self.progress = 0.0;
        self.track.restart();
    }

    /// Stop the active card, if any, and clear it.
    pub fn stop(&mut self) {
        self.reset_active();
    }

    pub fn fade_out(&mut self, total: Duration, steps: u64) {
        self.track.fade_out(total, steps);
    }

    /// Drain the shared element.
    pub fn pump(&mut self) {
        for ev in self.track.pump() {
            match ev {
                TrackEvent::Progress(f) => {
                    if self.active.is_some() {
                        self.progress = f;
                    }
                }
                TrackEvent::Ended | TrackEvent::Rejected(_) => {
                    debug!(index = ?self.active, event = ?ev, "preview finished");
                    self.reset_active();
                }
                TrackEvent::Ready(_) | TrackEvent::CanPlayThrough | TrackEvent::Failed(_) => {}
            }
        }
    }

    fn reset_active(&mut self) {
        if self.active.is_some() {
            self.track.stop();
        }
        self.active = None;
        self.progress = 0.0;
        self.suspended = false;
    }

    fn activate(&mut self, index: usize, cache: &mut DurationCache) {
        self.active = Some(index);
        self.suspended = false;

        let path = self.items[index].audio.clone();
        if self.track.source() != Some(path.as_path()) {
            self.track.load(&path);
        }
        // Display only; never waited on.
        cache.resolve(&path);
    }
}

impl Subscriber for PreviewDeck {
    fn on_signal(&mut self, signal: Signal) {
        match signal {
            Signal::ShowcaseOpened => {
                self.overlay_shown = true;
                if self.track.is_playing() {
                    self.track.pause();
                    self.suspended = true;
                }
            }
            Signal::ShowcaseClosed => {
                self.overlay_shown = false;
                if self.suspended {
                    self.suspended = false;
                    self.track.play();
                }
            }
            Signal::PreviewStarted | Signal::PreviewStopped => {}
        }
    }
}
