use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::*;
use crate::catalog::{Catalog, PreviewItem, ShowcaseEntry};
use crate::config::Settings;
use crate::media::fake::{FakeFactory, PlayPolicy};
use crate::media::{DurationProbe, ElementFactory};
use crate::playback::{Foreground, Stage};

struct NoProbe;

impl DurationProbe for NoProbe {
    fn probe(&self, _path: &Path) -> Option<Duration> {
        None
    }
}

fn item(i: u32) -> PreviewItem {
    PreviewItem {
        id: i + 1,
        title: format!("Cue {i}"),
        client: (i == 0).then(|| "Maison Lune".to_string()),
        category: "Film".into(),
        kind: None,
        audio: PathBuf::from(format!("/media/cue{i}.wav")),
        cover: None,
    }
}

fn app_with(previews: u32, reels: usize, ambient: bool) -> App {
    let catalog = Catalog {
        ambient: ambient.then(|| PathBuf::from("/media/ambient.ogg")),
        previews: (0..previews).map(item).collect(),
        showcase: (0..reels)
            .map(|i| ShowcaseEntry {
                title: format!("Reel {i}"),
                client: None,
                kind: Some("Mix".into()),
                video: PathBuf::from(format!("/media/reel{i}.mp4")),
                audio: None,
            })
            .collect(),
    };
    let mut settings = Settings::default();
    settings.showcase.transition_ms = 0;
    let factory: Rc<dyn ElementFactory> =
        Rc::new(FakeFactory::new(PlayPolicy::Resolve, Duration::from_secs(90)));
    let stage = Stage::new(catalog, factory, Arc::new(NoProbe), &settings);
    App::new(stage, 3)
}

#[test]
fn grid_navigation_moves_by_cell_and_row() {
    let mut app = app_with(7, 0, false);
    app.move_right();
    assert_eq!(app.selected_preview, 1);
    app.move_down();
    assert_eq!(app.selected_preview, 4);
    app.move_down();
    assert_eq!(app.selected_preview, 4, "no card below in the last row");
    app.move_up();
    assert_eq!(app.selected_preview, 1);
    app.move_up();
    assert_eq!(app.selected_preview, 1);

    app.selected_preview = 0;
    app.move_left();
    assert_eq!(app.selected_preview, 6);
    app.move_right();
    assert_eq!(app.selected_preview, 0);
}

#[test]
fn focus_only_moves_to_a_populated_pane() {
    let mut app = app_with(3, 0, false);
    app.toggle_focus();
    assert_eq!(app.focus, Pane::Previews);

    let mut app = app_with(3, 2, false);
    app.toggle_focus();
    assert_eq!(app.focus, Pane::Reels);
    app.move_down();
    app.move_down();
    assert_eq!(app.selected_reel, 1);
    app.move_up();
    assert_eq!(app.selected_reel, 0);
    app.toggle_focus();
    assert_eq!(app.focus, Pane::Previews);
}

#[test]
fn activate_toggles_a_card_or_opens_a_reel() {
    let mut app = app_with(3, 2, false);
    let now = Instant::now();

    app.selected_preview = 2;
    app.activate(now);
    assert_eq!(app.stage.foreground(), Foreground::Preview(2));
    assert_eq!(app.playback_state(), PlaybackState::Playing);

    app.toggle_focus();
    app.selected_reel = 1;
    app.activate(now);
    assert_eq!(app.stage.foreground(), Foreground::Showcase);
    assert_eq!(app.now_playing().unwrap().title, "Reel 1");
}

#[test]
fn navigation_is_locked_behind_the_overlay() {
    let mut app = app_with(6, 1, false);
    app.stage.open_showcase(0, Instant::now());
    app.move_right();
    app.move_down();
    assert_eq!(app.selected_preview, 0);

    app.stage.close_showcase(Instant::now());
    app.move_right();
    assert_eq!(app.selected_preview, 1);
}

#[test]
fn play_pause_follows_the_foreground() {
    let mut app = app_with(3, 1, true);
    assert_eq!(app.playback_state(), PlaybackState::Stopped);

    // Idle with an ambient bed: the bed starts.
    app.play_pause();
    assert_eq!(app.stage.foreground(), Foreground::Ambient);
    app.play_pause();
    assert_eq!(app.stage.foreground(), Foreground::Idle);

    app.stage.toggle_preview(1);
    app.play_pause();
    assert_eq!(app.stage.previews().active(), None);
}

#[test]
fn play_pause_without_ambient_plays_the_selected_card() {
    let mut app = app_with(3, 0, false);
    app.selected_preview = 2;
    app.play_pause();
    assert_eq!(app.stage.foreground(), Foreground::Preview(2));
}

#[test]
fn stop_closes_the_overlay_first() {
    let mut app = app_with(3, 1, false);
    let now = Instant::now();
    app.stage.toggle_preview(0);
    app.stage.open_showcase(0, now);

    app.stop(now);
    app.stage.pump();
    assert_eq!(app.stage.foreground(), Foreground::Preview(0));
    app.stop(now);
    assert_eq!(app.stage.foreground(), Foreground::Idle);
}

#[test]
fn step_preview_wraps_and_follows_the_cursor() {
    let mut app = app_with(4, 0, false);
    app.stage.toggle_preview(3);
    app.step_preview(1);
    assert_eq!(app.selected_preview, 0);
    assert_eq!(app.stage.foreground(), Foreground::Preview(0));

    app.step_preview(-1);
    assert_eq!(app.selected_preview, 3);
    assert_eq!(app.stage.previews().active(), Some(3));
}

#[test]
fn now_playing_describes_the_active_card() {
    let mut app = app_with(2, 0, false);
    assert!(app.now_playing().is_none());

    app.stage.toggle_preview(0);
    app.stage.pump();
    let np = app.now_playing().unwrap();
    assert_eq!(np.index, Some(0));
    assert_eq!(np.title, "Cue 0");
    assert_eq!(np.client, "Maison Lune");
    assert_eq!(np.kind, crate::catalog::DEFAULT_KIND);
    assert_eq!(np.path, PathBuf::from("/media/cue0.wav"));
    assert_eq!(np.duration, Some(Duration::from_secs(90)));
}

#[test]
fn help_window_toggles() {
    let mut app = app_with(1, 0, false);
    assert!(!app.help_window);
    app.toggle_help_window();
    assert!(app.help_window);
}
