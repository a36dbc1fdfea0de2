//! The stage owns every player and is the only place that decides which
//! source holds the output.

use std::cell::{Ref, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use super::ambient::AmbientPlayer;
use super::preview::PreviewDeck;
use super::showcase::Showcase;
use super::types::Foreground;
use crate::bus::{Bus, Signal};
use crate::catalog::{Catalog, ShowcaseEntry};
use crate::config::Settings;
use crate::media::{DurationCache, DurationProbe, ElementFactory, ElementKind};

pub struct Stage {
    bus: Bus,
    cache: DurationCache,
    ambient: Rc<RefCell<AmbientPlayer>>,
    previews: Rc<RefCell<PreviewDeck>>,
    showcase: Showcase,
    reels: Vec<ShowcaseEntry>,
    foreground: Foreground,
    // Last preview engagement announced on the bus.
    preview_engaged: bool,
}

impl Stage {
    pub fn new(
        catalog: Catalog,
        factory: Rc<dyn ElementFactory>,
        probe: Arc<dyn DurationProbe>,
        settings: &Settings,
    ) -> Self {
        let bus = Bus::new();
        let mut cache = DurationCache::new(probe);

        let ambient = Rc::new(RefCell::new(AmbientPlayer::new(
            factory.create(ElementKind::Audio),
            catalog.ambient.as_deref(),
            settings.ambient.volume,
            settings.ambient.autoplay,
        )));
        if settings.catalog.prefetch_durations {
            for item in &catalog.previews {
                cache.resolve(&item.audio);
            }
        }
        let previews = Rc::new(RefCell::new(PreviewDeck::new(
            catalog.previews,
            factory.create(ElementKind::Audio),
        )));
        bus.subscribe(&ambient);
        bus.subscribe(&previews);

        let showcase = Showcase::new(
            bus.clone(),
            factory,
            settings.showcase.default_volume,
            Duration::from_millis(settings.showcase.transition_ms),
        );

        Self {
            bus,
            cache,
            ambient,
            previews,
            showcase,
            reels: catalog.showcase,
            foreground: Foreground::Idle,
            preview_engaged: false,
        }
    }

    pub fn foreground(&self) -> Foreground {
        self.foreground
    }

    pub fn ambient(&self) -> Ref<'_, AmbientPlayer> {
        self.ambient.borrow()
    }

    pub fn previews(&self) -> Ref<'_, PreviewDeck> {
        self.previews.borrow()
    }

    pub fn showcase(&self) -> &Showcase {
        &self.showcase
    }

    pub fn reels(&self) -> &[ShowcaseEntry] {
        &self.reels
    }

    pub fn durations(&self) -> &DurationCache {
        &self.cache
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn toggle_preview(&mut self, index: usize) {
        if index >= self.previews.borrow().len() {
            return;
        }
        let starting = self.previews.borrow().active() != Some(index);
        if starting && !self.showcase.state().is_shown() {
            self.announce_preview(true);
        }
        self.previews.borrow_mut().toggle(index, &mut self.cache);
        self.settle();
    }

    pub fn restart_preview(&mut self, index: usize) {
        if index >= self.previews.borrow().len() {
            return;
        }
        if !self.showcase.state().is_shown() {
            self.announce_preview(true);
        }
        self.previews.borrow_mut().restart(index, &mut self.cache);
        self.settle();
    }

    pub fn toggle_ambient(&mut self) {
        let turning_on = !self.ambient.borrow().is_wanted();
        if turning_on && !self.showcase.state().is_shown() {
            // The bed takes over from a playing preview.
            self.previews.borrow_mut().stop();
            self.announce_preview(false);
        }
        self.ambient.borrow_mut().toggle();
        self.settle();
    }

    /// Any user interaction. Unlocks ambient autoplay the first time.
    pub fn user_gesture(&mut self) {
        self.ambient.borrow_mut().on_gesture();
        self.settle();
    }

    pub fn open_showcase(&mut self, index: usize, now: Instant) {
        let Some(entry) = self.reels.get(index).cloned() else {
            debug!(index, "no showcase entry");
            return;
        };
        self.showcase.open(entry, now);
        self.settle();
    }

    pub fn close_showcase(&mut self, now: Instant) -> bool {
        let closed = self.showcase.close(now);
        self.settle();
        closed
    }

    pub fn showcase_play_pause(&mut self) -> bool {
        let acted = self.showcase.play_pause();
        self.settle();
        acted
    }

    pub fn showcase_restart(&mut self) -> bool {
        let acted = self.showcase.restart();
        self.settle();
        acted
    }

    pub fn showcase_volume(&mut self, percent: u8) -> bool {
        self.showcase.set_volume_percent(percent)
    }

    pub fn showcase_toggle_mute(&mut self) -> bool {
        self.showcase.toggle_mute()
    }

    /// Drain every player and the duration cache.
    pub fn pump(&mut self) {
        self.cache.pump();
        self.previews.borrow_mut().pump();
        self.ambient.borrow_mut().pump();
        self.showcase.pump();
        self.settle();
    }

    pub fn tick(&mut self, now: Instant) {
        self.showcase.tick(now);
    }

    /// Fade out whatever is audible before exit.
    pub fn shutdown(&mut self, fade: Duration, steps: u64) {
        match self.foreground {
            Foreground::Showcase => self.showcase.fade_out(fade, steps),
            Foreground::Ambient => self.ambient.borrow_mut().fade_out(fade, steps),
            Foreground::Preview(_) => {
                let mut deck = self.previews.borrow_mut();
                if deck.is_playing() {
                    deck.fade_out(fade, steps);
                }
            }
            Foreground::Idle => {}
        }
        self.foreground = Foreground::Idle;
    }

    /// Every source currently reporting that it plays.
    pub fn audible_sources(&self) -> Vec<Foreground> {
        let mut out = Vec::new();
        if self.ambient.borrow().is_playing() {
            out.push(Foreground::Ambient);
        }
        if let Some(i) = self.previews.borrow().playing_index() {
            out.push(Foreground::Preview(i));
        }
        if self.showcase.is_playing() {
            out.push(Foreground::Showcase);
        }
        out
    }

    fn announce_preview(&mut self, engaged: bool) {
        if self.preview_engaged == engaged {
            return;
        }
        self.preview_engaged = engaged;
        self.bus.publish(if engaged {
            Signal::PreviewStarted
        } else {
            Signal::PreviewStopped
        });
    }

    fn settle(&mut self) {
        let engaged = self.previews.borrow().active().is_some();
        if !engaged {
            self.announce_preview(false);
        }
        self.foreground = self.compute_foreground();
    }

    fn compute_foreground(&self) -> Foreground {
        if self.showcase.state().is_shown() {
            return Foreground::Showcase;
        }
        if let Some(i) = self.previews.borrow().active() {
            return Foreground::Preview(i);
        }
        if self.ambient.borrow().is_playing() {
            return Foreground::Ambient;
        }
        Foreground::Idle
    }
}
