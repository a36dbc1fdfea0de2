//! Full-screen showcase overlay: a video stream plus an optional separate
//! soundtrack, driven as one pair.

use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::types::OverlayState;
use crate::bus::{Bus, Signal};
use crate::catalog::ShowcaseEntry;
use crate::media::{ElementFactory, ElementKind, MediaTrack, TrackEvent};

/// Volume shared by both streams of the pair.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Volume {
    level: f32,
    muted_from: Option<f32>,
}

impl Volume {
    pub fn new(level: f32) -> Self {
        Self {
            level: clamp_volume(level),
            muted_from: None,
        }
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn percent(&self) -> u8 {
        (self.level * 100.0).round() as u8
    }

    pub fn is_muted(&self) -> bool {
        self.muted_from.is_some()
    }
}

fn clamp_volume(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

struct Pair {
    video: MediaTrack,
    audio: Option<MediaTrack>,
}

impl Pair {
    fn tracks_mut(&mut self) -> impl Iterator<Item = &mut MediaTrack> {
        std::iter::once(&mut self.video).chain(self.audio.as_mut())
    }

    fn is_playing(&self) -> bool {
        self.video.is_playing() || self.audio.as_ref().is_some_and(MediaTrack::is_playing)
    }

    fn pause(&mut self) {
        for t in self.tracks_mut() {
            t.pause();
        }
    }

    fn play(&mut self) {
        for t in self.tracks_mut() {
            t.play();
        }
    }
}

pub struct Showcase {
    bus: Bus,
    factory: Rc<dyn ElementFactory>,
    state: OverlayState,
    entry: Option<ShowcaseEntry>,
    pair: Option<Pair>,
    loaded: bool,
    volume: Volume,
    default_volume: f32,
    scroll_locked: bool,
    transition: Duration,
    transition_started: Option<Instant>,
}

impl Showcase {
    pub fn new(
        bus: Bus,
        factory: Rc<dyn ElementFactory>,
        default_volume: f32,
        transition: Duration,
    ) -> Self {
        Self {
            bus,
            factory,
            state: OverlayState::Closed,
            entry: None,
            pair: None,
            loaded: false,
            volume: Volume::new(default_volume),
            default_volume: clamp_volume(default_volume),
            scroll_locked: false,
            transition,
            transition_started: None,
        }
    }

    pub fn state(&self) -> OverlayState {
        self.state
    }

    /// The entry on screen, kept through the closing transition.
    pub fn entry(&self) -> Option<&ShowcaseEntry> {
        self.entry.as_ref()
    }

    /// Whether the video reported it can play through. Until then the overlay
    /// shows a placeholder and transport controls do nothing.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_playing(&self) -> bool {
        self.pair.as_ref().is_some_and(Pair::is_playing)
    }

    /// The video failed to open or decode; the overlay stays on its placeholder.
    pub fn is_unavailable(&self) -> bool {
        self.pair.as_ref().is_some_and(|p| p.video.has_failed())
    }

    pub fn volume(&self) -> Volume {
        self.volume
    }

    pub fn scroll_locked(&self) -> bool {
        self.scroll_locked
    }

    /// Elapsed and total time of the video stream.
    pub fn clock(&self) -> Option<(Duration, Option<Duration>)> {
        self.pair
            .as_ref()
            .map(|p| (p.video.position(), p.video.duration()))
    }

    pub fn progress(&self) -> f32 {
        self.pair.as_ref().map_or(0.0, |p| p.video.progress())
    }

    /// Show `entry` and start both streams. Opening over an already shown
    /// entry replaces its pair without releasing the output.
    pub fn open(&mut self, entry: ShowcaseEntry, now: Instant) {
        if self.state.is_shown() {
            debug!(from = ?self.entry.as_ref().map(|e| &e.title), "switching showcase entry");
            self.teardown();
        } else {
            self.bus.publish(Signal::ShowcaseOpened);
            self.scroll_locked = true;
        }

        info!(title = %entry.title, "showcase open");
        let mut video = MediaTrack::new(self.factory.create(ElementKind::Video), false);
        video.load(&entry.video);
        let audio = entry.audio.as_ref().map(|path| {
            let mut track = MediaTrack::new(self.factory.create(ElementKind::Audio), false);
            track.load(path);
            track
        });

        let mut pair = Pair { video, audio };
        let level = self.volume.level;
        for t in pair.tracks_mut() {
            t.set_volume(level);
        }
        pair.play();

        self.pair = Some(pair);
        self.entry = Some(entry);
        self.loaded = false;
        self.begin_transition(OverlayState::Opening, now);
    }

    /// Stop both streams and release the output. Returns `false` when the
    /// overlay was not shown.
    pub fn close(&mut self, now: Instant) -> bool {
        if !self.state.is_shown() {
            return false;
        }
        info!("showcase close");
        self.teardown();
        self.scroll_locked = false;
        self.bus.publish(Signal::ShowcaseClosed);
        self.begin_transition(OverlayState::Closing, now);
        true
    }

    /// Advance timed transitions.
    pub fn tick(&mut self, now: Instant) {
        let Some(started) = self.transition_started else {
            return;
        };
        if now.saturating_duration_since(started) < self.transition {
            return;
        }
        self.finish_transition();
    }

    pub fn play_pause(&mut self) -> bool {
        let Some(pair) = self.controllable() else {
            return false;
        };
        if pair.is_playing() {
            pair.pause();
        } else {
            pair.play();
        }
        true
    }

    pub fn restart(&mut self) -> bool {
        let Some(pair) = self.controllable() else {
            return false;
        };
        for t in pair.tracks_mut() {
            t.seek_to(0.0);
        }
        pair.play();
        true
    }

    /// The single volume setter; both streams always follow it.
    pub fn set_volume(&mut self, level: f32) -> bool {
        if self.controllable().is_none() {
            return false;
        }
        self.apply_volume(level);
        self.volume.muted_from = None;
        true
    }

    pub fn set_volume_percent(&mut self, percent: u8) -> bool {
        self.set_volume(f32::from(percent.min(100)) / 100.0)
    }

    pub fn toggle_mute(&mut self) -> bool {
        if self.controllable().is_none() {
            return false;
        }
        match self.volume.muted_from.take() {
            Some(previous) => self.apply_volume(previous),
            None => {
                let previous = if self.volume.level > 0.0 {
                    self.volume.level
                } else {
                    self.default_volume
                };
                self.apply_volume(0.0);
                self.volume.muted_from = Some(previous);
            }
        }
        true
    }

    pub fn pump(&mut self) {
        let Some(pair) = self.pair.as_mut() else {
            return;
        };

        let mut rejected = false;
        for ev in pair.video.pump() {
            match ev {
                TrackEvent::CanPlayThrough => self.loaded = true,
                TrackEvent::Rejected(_) => rejected = true,
                TrackEvent::Failed(msg) => warn!("showcase video unavailable: {msg}"),
                _ => {}
            }
        }
        if let Some(audio) = pair.audio.as_mut() {
            for ev in audio.pump() {
                if let TrackEvent::Rejected(_) = ev {
                    rejected = true;
                }
            }
        }

        if rejected {
            debug!("showcase play refused; pausing both streams");
            pair.pause();
        }
    }

    /// Ramp both streams down together, then pause them.
    pub fn fade_out(&mut self, total: Duration, steps: u64) {
        let Some(pair) = self.pair.as_mut() else {
            return;
        };
        if !pair.is_playing() {
            return;
        }
        let start = self.volume.level;
        if !total.is_zero() {
            let steps = steps.max(1);
            let step_dur = (total / steps as u32).max(Duration::from_millis(1));
            for step in 1..=steps {
                let level = start * (1.0 - step as f32 / steps as f32);
                for t in pair.tracks_mut() {
                    t.set_volume(level);
                }
                thread::sleep(step_dur);
            }
        }
        pair.pause();
    }

    fn controllable(&mut self) -> Option<&mut Pair> {
        if !self.state.is_shown() || !self.loaded {
            return None;
        }
        self.pair.as_mut()
    }

    fn apply_volume(&mut self, level: f32) {
        self.volume.level = clamp_volume(level);
        let level = self.volume.level;
        if let Some(pair) = self.pair.as_mut() {
            for t in pair.tracks_mut() {
                t.set_volume(level);
            }
        }
    }

    fn teardown(&mut self) {
        if let Some(mut pair) = self.pair.take() {
            pair.pause();
        }
        self.loaded = false;
    }

    fn begin_transition(&mut self, to: OverlayState, now: Instant) {
        self.state = to;
        self.transition_started = Some(now);
        if self.transition.is_zero() {
            self.finish_transition();
        }
    }

    fn finish_transition(&mut self) {
        self.transition_started = None;
        match self.state {
            OverlayState::Opening => self.state = OverlayState::Open,
            OverlayState::Closing => {
                self.state = OverlayState::Closed;
                self.entry = None;
            }
            OverlayState::Open | OverlayState::Closed => {}
        }
    }
}
