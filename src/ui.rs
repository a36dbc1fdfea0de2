//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`: the
//! header, the ambient/status line, the preview grid, the reel list, the
//! showcase overlay and the controls footer.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::Line,
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock};

use crate::app::{App, Pane, PlaybackState};
use crate::catalog::card_line;
use crate::config::UiSettings;
use crate::media::format_clock;
use crate::playback::{Foreground, OverlayState};

const CARD_HEIGHT: u16 = 4;

static CONTROLS_MAP: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = BTreeMap::new();
    map.insert("h/j/k/l", "move");
    map.insert("tab", "previews/reels");
    map.insert("enter", "play card / open reel");
    map.insert("r", "restart card");
    map.insert("n/p", "next/prev card");
    map.insert("a", "ambient on/off");
    map.insert("o", "open reel");
    map.insert("esc/x", "close reel");
    map.insert("space", "play/pause");
    map.insert("R", "restart reel");
    map.insert("+/-", "volume");
    map.insert("m", "mute");
    map.insert("?", "help");
    map.insert("q", "quit");
    map
});

/// Render the controls help text in a stable order.
fn controls_text(order: &[&str]) -> String {
    order
        .iter()
        .filter_map(|k| CONTROLS_MAP.get(*k).map(|v| format!("[{k}] {v}")))
        .collect::<Vec<String>>()
        .join(" | ")
}

fn footer_text(app: &App) -> String {
    if app.stage.showcase().state().is_shown() {
        controls_text(&["space", "R", "+/-", "m", "esc/x", "q"])
    } else {
        controls_text(&["h/j/k/l", "tab", "enter", "r", "a", "o", "?", "q"])
    }
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn status_text(app: &App) -> String {
    let mut parts: Vec<String> = Vec::new();

    let bed = {
        let ambient = app.stage.ambient();
        if !ambient.is_configured() {
            "AMBIENT: none"
        } else if ambient.is_playing() {
            "AMBIENT: on"
        } else if ambient.is_wanted() && ambient.is_interrupted() {
            "AMBIENT: held"
        } else if ambient.is_wanted() {
            "AMBIENT: starting"
        } else {
            "AMBIENT: off"
        }
    };
    parts.push(format!(" {bed}"));

    match app.stage.foreground() {
        Foreground::Idle => parts.push("Idle".to_string()),
        Foreground::Ambient => parts.push("Ambient bed".to_string()),
        Foreground::Preview(_) | Foreground::Showcase => {
            if let Some(np) = app.now_playing() {
                parts.push(format!("{} · {}", np.title, np.client));
            }
        }
    }

    let state = match app.playback_state() {
        PlaybackState::Stopped => "Stopped",
        PlaybackState::Playing => "Playing",
        PlaybackState::Paused => "Paused",
    };
    parts.push(state.to_string());

    parts.join(" • ")
}

/// Render the entire UI into the provided `frame`.
pub fn draw(frame: &mut Frame, app: &App, ui_settings: &UiSettings) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" atelier ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let status = Paragraph::new(status_text(app))
        .block(Block::bordered().title(" status "))
        .wrap(Wrap { trim: true });
    frame.render_widget(status, chunks[1]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(chunks[2]);
    draw_previews(frame, app, ui_settings, body[0]);
    draw_reels(frame, app, body[1]);

    if app.stage.showcase().entry().is_some() {
        draw_overlay(frame, app, chunks[2]);
    }

    if app.help_window {
        let popup = centered_rect_sized(60, 18, chunks[2]);
        frame.render_widget(Clear, popup);
        let order = [
            "h/j/k/l", "tab", "enter", "r", "n/p", "a", "o", "esc/x", "space", "R", "+/-", "m", "?",
            "q",
        ];
        let lines: Vec<Line> = order
            .iter()
            .filter_map(|k| CONTROLS_MAP.get(*k).map(|v| Line::from(format!("{k:>8}  {v}"))))
            .collect();
        let help = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" help (? closes) ")
                .padding(Padding::horizontal(1)),
        );
        frame.render_widget(help, popup);
    }

    let footer = Paragraph::new(footer_text(app))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding::left(1)),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[3]);
}

fn draw_previews(frame: &mut Frame, app: &App, ui: &UiSettings, area: Rect) {
    let focused = app.focus == Pane::Previews;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" previews ")
        .border_style(if focused {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        });
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let deck = app.stage.previews();
    let items = deck.items();
    if items.is_empty() {
        frame.render_widget(Paragraph::new("No previews in the catalog."), inner);
        return;
    }

    let columns = app.columns;
    let rows_total = items.len().div_ceil(columns);
    let rows_visible = usize::from((inner.height / CARD_HEIGHT).max(1));
    let selected_row = app.selected_preview / columns;
    // Keep the selected row on screen.
    let first_row = selected_row
        .saturating_sub(rows_visible - 1)
        .min(rows_total.saturating_sub(rows_visible));

    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(CARD_HEIGHT); rows_visible])
        .split(inner);
    let col_constraints = vec![Constraint::Ratio(1, columns as u32); columns];

    for (r, row_area) in row_areas.iter().enumerate() {
        let row = first_row + r;
        if row >= rows_total {
            break;
        }
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(col_constraints.clone())
            .split(*row_area);
        for (c, cell) in cells.iter().enumerate() {
            let index = row * columns + c;
            let Some(item) = items.get(index) else {
                break;
            };

            let active = deck.active() == Some(index);
            let marker = if deck.playing_index() == Some(index) {
                "▶ "
            } else if active && deck.is_suspended() {
                "⏸ "
            } else if active {
                "… "
            } else {
                ""
            };
            let mut style = Style::default();
            if focused && index == app.selected_preview {
                style = style.add_modifier(Modifier::REVERSED);
            }

            let duration = app.stage.durations().label(&item.audio);
            let card = Block::default()
                .borders(Borders::ALL)
                .title(format!(" {marker}{} ", item.title))
                .style(style);
            let card_inner = card.inner(*cell);
            frame.render_widget(card, *cell);

            let lines = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(1), Constraint::Length(1)])
                .split(card_inner);
            let info = card_line(item, &duration, &ui.card_fields, &ui.card_separator);
            frame.render_widget(Paragraph::new(info).italic(), lines[0]);

            let progress = f64::from(deck.progress_of(index)).clamp(0.0, 1.0);
            let gauge = Gauge::default().ratio(progress).label("");
            frame.render_widget(gauge, lines[1]);
        }
    }
}

fn draw_reels(frame: &mut Frame, app: &App, area: Rect) {
    let reels = app.stage.reels();
    let items: Vec<ListItem> = reels
        .iter()
        .map(|e| ListItem::new(format!("{} · {}", e.title, e.kind_label())))
        .collect();

    let focused = app.focus == Pane::Reels;
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" reels "))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol(if focused { "> " } else { "  " });
    let mut state = ListState::default();
    if !reels.is_empty() {
        state.select(Some(app.selected_reel));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let showcase = app.stage.showcase();
    let Some(entry) = showcase.entry() else {
        return;
    };

    let popup = centered_rect_sized(area.width.saturating_sub(6), 9, area);
    frame.render_widget(Clear, popup);

    let title = match showcase.state() {
        OverlayState::Opening => format!(" {} (opening) ", entry.title),
        OverlayState::Closing => format!(" {} (closing) ", entry.title),
        OverlayState::Open | OverlayState::Closed => format!(" {} ", entry.title),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_alignment(Alignment::Center)
        .padding(Padding::horizontal(1));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    frame.render_widget(
        Paragraph::new(format!("{} · {}", entry.client_label(), entry.kind_label())),
        rows[0],
    );

    if !showcase.is_loaded() {
        let text = if showcase.is_unavailable() {
            "loading… (source unavailable)"
        } else {
            "loading…"
        };
        frame.render_widget(Paragraph::new(text).slow_blink(), rows[2]);
        return;
    }

    let (elapsed, total) = showcase.clock().unwrap_or_default();
    let state = if showcase.is_playing() { "▶" } else { "⏸" };
    let volume = showcase.volume();
    let volume_text = if volume.is_muted() {
        "muted".to_string()
    } else {
        format!("vol {}%", volume.percent())
    };
    frame.render_widget(
        Paragraph::new(format!("{state} {}  {volume_text}", format_clock(elapsed, total))),
        rows[2],
    );
    frame.render_widget(
        Gauge::default()
            .ratio(f64::from(showcase.progress()).clamp(0.0, 1.0))
            .label(""),
        rows[3],
    );
}
