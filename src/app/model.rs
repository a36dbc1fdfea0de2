//! Application model types: `App`, `Pane` and `PlaybackState`.
//!
//! The `App` struct holds the stage and the cursor state the UI and runtime
//! need on top of it: which pane has focus, which card and reel are selected
//! and whether the help popup is shown.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::playback::{Foreground, Stage};

/// The playback state reported to the desktop.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Which part of the page the cursor moves in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Pane {
    #[default]
    Previews,
    Reels,
}

/// What the foreground source is playing, for the status line and MPRIS.
#[derive(Clone, Debug, PartialEq)]
pub struct NowPlaying {
    /// Preview index, when the foreground is a preview.
    pub index: Option<usize>,
    pub title: String,
    pub client: String,
    pub kind: String,
    pub path: PathBuf,
    pub duration: Option<Duration>,
}

/// The main application model.
pub struct App {
    pub stage: Stage,
    pub focus: Pane,
    pub selected_preview: usize,
    pub selected_reel: usize,
    pub columns: usize,
    pub help_window: bool,
}

impl App {
    /// Create a new `App` around `stage`, laying previews out in `columns`.
    pub fn new(stage: Stage, columns: usize) -> Self {
        Self {
            stage,
            focus: Pane::Previews,
            selected_preview: 0,
            selected_reel: 0,
            columns: columns.max(1),
            help_window: false,
        }
    }

    pub fn toggle_help_window(&mut self) {
        self.help_window = !self.help_window;
    }

    /// Switch focus between the preview grid and the reel list. A pane with
    /// nothing in it never takes focus.
    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Pane::Previews if !self.stage.reels().is_empty() => Pane::Reels,
            Pane::Reels if !self.stage.previews().is_empty() => Pane::Previews,
            other => other,
        };
    }

    /// Whether the page is scroll-locked by the overlay.
    pub fn navigation_locked(&self) -> bool {
        self.stage.showcase().scroll_locked()
    }

    pub fn move_left(&mut self) {
        if self.navigation_locked() || self.focus != Pane::Previews {
            return;
        }
        let len = self.stage.previews().len();
        if len > 0 {
            self.selected_preview = (self.selected_preview + len - 1) % len;
        }
    }

    pub fn move_right(&mut self) {
        if self.navigation_locked() || self.focus != Pane::Previews {
            return;
        }
        let len = self.stage.previews().len();
        if len > 0 {
            self.selected_preview = (self.selected_preview + 1) % len;
        }
    }

    pub fn move_down(&mut self) {
        if self.navigation_locked() {
            return;
        }
        match self.focus {
            Pane::Previews => {
                let len = self.stage.previews().len();
                let next = self.selected_preview + self.columns;
                if next < len {
                    self.selected_preview = next;
                }
            }
            Pane::Reels => {
                let len = self.stage.reels().len();
                if self.selected_reel + 1 < len {
                    self.selected_reel += 1;
                }
            }
        }
    }

    pub fn move_up(&mut self) {
        if self.navigation_locked() {
            return;
        }
        match self.focus {
            Pane::Previews => {
                if self.selected_preview >= self.columns {
                    self.selected_preview -= self.columns;
                }
            }
            Pane::Reels => self.selected_reel = self.selected_reel.saturating_sub(1),
        }
    }

    /// Enter: toggle the selected card, or open the selected reel.
    pub fn activate(&mut self, now: Instant) {
        match self.focus {
            Pane::Previews => self.stage.toggle_preview(self.selected_preview),
            Pane::Reels => self.stage.open_showcase(self.selected_reel, now),
        }
    }

    /// Play the card after (or before, for negative `step`) the active one,
    /// from the start, and move the cursor onto it.
    pub fn step_preview(&mut self, step: isize) {
        let len = self.stage.previews().len();
        if len == 0 {
            return;
        }
        let from = self
            .stage
            .previews()
            .active()
            .unwrap_or(self.selected_preview);
        let target = (from as isize + step).rem_euclid(len as isize) as usize;
        self.selected_preview = target;
        self.stage.restart_preview(target);
    }

    /// Desktop-level play/pause: acts on whatever holds the foreground.
    pub fn play_pause(&mut self) {
        match self.stage.foreground() {
            Foreground::Showcase => {
                self.stage.showcase_play_pause();
            }
            Foreground::Preview(i) => self.stage.toggle_preview(i),
            Foreground::Ambient => self.stage.toggle_ambient(),
            Foreground::Idle => {
                if self.stage.ambient().is_configured() {
                    self.stage.toggle_ambient();
                } else if !self.stage.previews().is_empty() {
                    self.stage.toggle_preview(self.selected_preview);
                }
            }
        }
    }

    /// Silence the foreground: close the overlay, stop the preview or turn
    /// the ambient bed off.
    pub fn stop(&mut self, now: Instant) {
        match self.stage.foreground() {
            Foreground::Showcase => {
                self.stage.close_showcase(now);
            }
            Foreground::Preview(i) => self.stage.toggle_preview(i),
            Foreground::Ambient => self.stage.toggle_ambient(),
            Foreground::Idle => {}
        }
    }

    pub fn playback_state(&self) -> PlaybackState {
        match self.stage.foreground() {
            Foreground::Idle => PlaybackState::Stopped,
            Foreground::Ambient => PlaybackState::Playing,
            Foreground::Preview(_) => {
                if self.stage.previews().is_playing() {
                    PlaybackState::Playing
                } else {
                    PlaybackState::Paused
                }
            }
            Foreground::Showcase => {
                if self.stage.showcase().is_playing() {
                    PlaybackState::Playing
                } else {
                    PlaybackState::Paused
                }
            }
        }
    }

    pub fn now_playing(&self) -> Option<NowPlaying> {
        match self.stage.foreground() {
            Foreground::Idle => None,
            Foreground::Ambient => {
                let path = self.stage.ambient().source()?.to_path_buf();
                Some(NowPlaying {
                    index: None,
                    title: "Ambient".to_string(),
                    client: crate::catalog::DEFAULT_CLIENT.to_string(),
                    kind: "Ambience".to_string(),
                    duration: self.stage.durations().duration(&path),
                    path,
                })
            }
            Foreground::Preview(i) => {
                let deck = self.stage.previews();
                let item = deck.items().get(i)?;
                Some(NowPlaying {
                    index: Some(i),
                    title: item.title.clone(),
                    client: item.client_label().to_string(),
                    kind: item.kind_label().to_string(),
                    path: item.audio.clone(),
                    duration: self
                        .stage
                        .durations()
                        .duration(&item.audio)
                        .or_else(|| deck.track().duration()),
                })
            }
            Foreground::Showcase => {
                let showcase = self.stage.showcase();
                let entry = showcase.entry()?;
                Some(NowPlaying {
                    index: None,
                    title: entry.title.clone(),
                    client: entry.client_label().to_string(),
                    kind: entry.kind_label().to_string(),
                    path: entry.video.clone(),
                    duration: showcase.clock().and_then(|(_, total)| total),
                })
            }
        }
    }
}
