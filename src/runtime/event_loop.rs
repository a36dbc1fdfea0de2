use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::debug;

use crate::app::{App, NowPlaying, PlaybackState};
use crate::config;
use crate::mpris::{ControlCmd, MprisHandle};
use crate::runtime::mpris_sync::update_mpris;
use crate::ui;

/// State tracked by the runtime event loop across iterations.
pub struct EventLoopState {
    /// Last playback state emitted to MPRIS.
    pub last_mpris_playback: PlaybackState,
    /// Last now-playing description emitted to MPRIS.
    pub last_mpris_now: Option<NowPlaying>,
}

impl EventLoopState {
    /// Construct a new `EventLoopState` seeded from `app`.
    pub fn new(app: &App) -> Self {
        Self {
            last_mpris_playback: app.playback_state(),
            last_mpris_now: app.now_playing(),
        }
    }
}

/// Main terminal event loop: advances the stage, draws, handles input and
/// keeps MPRIS in sync. Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    mpris: &MprisHandle,
    control_tx: &mpsc::Sender<ControlCmd>,
    control_rx: &mpsc::Receiver<ControlCmd>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        app.stage.tick(Instant::now());
        app.stage.pump();
        debug_assert!(app.stage.audible_sources().len() <= 1);

        // Keep MPRIS in sync even when playback changes on its own (ended
        // previews, refused plays, overlay transitions).
        let playback = app.playback_state();
        let now = app.now_playing();
        if playback != state.last_mpris_playback || now != state.last_mpris_now {
            update_mpris(mpris, app);
            state.last_mpris_playback = playback;
            state.last_mpris_now = now;
        }

        terminal.draw(|f| ui::draw(f, app, &settings.ui))?;

        while let Ok(cmd) = control_rx.try_recv() {
            if handle_control_cmd(cmd, settings, app) {
                return Ok(());
            }
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, control_tx) {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn quit(settings: &config::Settings, app: &mut App) {
    app.stage.shutdown(
        Duration::from_millis(settings.audio.quit_fade_out_ms),
        settings.audio.fade_steps,
    );
}

/// Apply a desktop media command. Returns `true` when shutdown is requested.
fn handle_control_cmd(cmd: ControlCmd, settings: &config::Settings, app: &mut App) -> bool {
    debug!(?cmd, "control command");
    let now = Instant::now();
    match cmd {
        ControlCmd::Quit => {
            quit(settings, app);
            return true;
        }
        ControlCmd::Play => {
            if app.playback_state() != PlaybackState::Playing {
                app.play_pause();
            }
        }
        ControlCmd::Pause => {
            if app.playback_state() == PlaybackState::Playing {
                app.play_pause();
            }
        }
        ControlCmd::PlayPause => app.play_pause(),
        ControlCmd::Stop => app.stop(now),
        ControlCmd::Next => app.step_preview(1),
        ControlCmd::Prev => app.step_preview(-1),
    }
    false
}

/// Returns `true` when shutdown is requested.
fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    control_tx: &mpsc::Sender<ControlCmd>,
) -> bool {
    if key.code == KeyCode::Char('q') {
        quit(settings, app);
        return true;
    }

    let now = Instant::now();
    let overlay = app.stage.showcase().state().is_shown();
    let step = settings.showcase.volume_step;

    match key.code {
        KeyCode::Char('?') => app.toggle_help_window(),
        KeyCode::Esc if app.help_window => app.toggle_help_window(),
        KeyCode::Esc | KeyCode::Char('x') => {
            app.stage.close_showcase(now);
        }
        KeyCode::Char(' ') => {
            if overlay {
                app.stage.showcase_play_pause();
            } else {
                let _ = control_tx.send(ControlCmd::PlayPause);
            }
        }
        KeyCode::Char('R') => {
            app.stage.showcase_restart();
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            let pct = app.stage.showcase().volume().percent();
            app.stage.showcase_volume(pct.saturating_add(step).min(100));
        }
        KeyCode::Char('-') => {
            let pct = app.stage.showcase().volume().percent();
            app.stage.showcase_volume(pct.saturating_sub(step));
        }
        KeyCode::Char('m') => {
            app.stage.showcase_toggle_mute();
        }
        // Everything below acts on the page, which the overlay covers.
        _ if overlay => {}
        KeyCode::Char('h') | KeyCode::Left => app.move_left(),
        KeyCode::Char('l') | KeyCode::Right => app.move_right(),
        KeyCode::Char('j') | KeyCode::Down => app.move_down(),
        KeyCode::Char('k') | KeyCode::Up => app.move_up(),
        KeyCode::Tab => app.toggle_focus(),
        KeyCode::Enter => app.activate(now),
        KeyCode::Char('r') => app.stage.restart_preview(app.selected_preview),
        KeyCode::Char('a') => app.stage.toggle_ambient(),
        KeyCode::Char('o') => app.stage.open_showcase(app.selected_reel, now),
        KeyCode::Char('n') => {
            let _ = control_tx.send(ControlCmd::Next);
        }
        KeyCode::Char('p') => {
            let _ = control_tx.send(ControlCmd::Prev);
        }
        _ => {}
    }

    // Any interaction counts as the gesture that unlocks ambient autoplay. It
    // runs after the key so an explicit ambient toggle is seen first.
    app.stage.user_gesture();

    false
}
