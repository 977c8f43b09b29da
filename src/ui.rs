//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style},
    widgets::{Block, Borders, List, ListItem, Padding, Paragraph, Wrap},
};
use std::time::Duration;

use crate::app::App;
use crate::config::UiSettings;
use crate::player::{PlaybackInfo, PlaybackState};

/// Render the controls help text, incorporating scrub seconds.
fn controls_text(scrub_seconds: u64) -> String {
    [
        "[j/k] up/down".to_string(),
        "[enter] play selected".to_string(),
        "[space/p] play/pause".to_string(),
        "[h/l] prev/next".to_string(),
        format!("[H/L] scrub -/+{}s", scrub_seconds),
        "[s] stop".to_string(),
        "[m] mute".to_string(),
        "[f] favorite".to_string(),
        "[F] favorites view".to_string(),
        "[v] songs/videos".to_string(),
        "[R] rescan".to_string(),
        "[q] quit".to_string(),
    ]
    .join(" | ")
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn status_text(app: &App, info: &PlaybackInfo) -> String {
    let mut parts: Vec<String> = Vec::new();

    let mut view = format!("View: {}", app.view_kind.label());
    if app.favorites_only {
        view.push_str(" (favorites)");
    }
    parts.push(view);

    match app.now_playing().and_then(|i| app.item(i)) {
        Some(item) => {
            let state = match info.state {
                PlaybackState::Playing => "Playing",
                PlaybackState::Paused => "Paused",
                PlaybackState::Loading => "Loading",
                PlaybackState::Idle => "Stopped",
            };
            // Unknown durations show as 00:00 until the loader resolves them.
            parts.push(format!(
                "{state}: {} [{} / {}]",
                item.display,
                format_mmss(info.elapsed),
                format_mmss(info.duration)
            ));
        }
        None => parts.push("Stopped".to_string()),
    }

    if info.muted {
        parts.push("Muted".to_string());
    }
    if !app.favorites.is_empty() {
        parts.push(format!("Favorites: {}", app.favorites.len()));
    }

    parts.join(" • ")
}

/// Render the entire UI into the provided `frame`.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    display: &[usize],
    info: &PlaybackInfo,
    ui_settings: &UiSettings,
    scrub_seconds: u64,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" echo-play ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Status box
    let status = Paragraph::new(status_text(app, info))
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status, chunks[1]);

    // Main list: center the selected item when possible by building only the
    // visible window (avoid allocating items for the entire library).
    {
        let total = display.len();
        let list_height = chunks[2].height as usize;
        let sel_pos = display.iter().position(|&i| i == app.selected).unwrap_or(0);
        let (start, end, selected_pos_in_visible) = if total <= list_height || list_height == 0 {
            (0, total, sel_pos)
        } else {
            let half = list_height / 2;
            let mut start = if sel_pos > half { sel_pos - half } else { 0 };
            if start + list_height > total {
                start = total - list_height;
            }
            (start, start + list_height, sel_pos - start)
        };

        let visible_items: Vec<ListItem> = display[start..end]
            .iter()
            .map(|&i| {
                let item = &app.items[i];
                let star = if app.favorites.is_favorite(&item.path) {
                    "★ "
                } else {
                    "  "
                };
                let marker = if app.now_playing() == Some(i) { "♪ " } else { "" };
                ListItem::new(format!("{star}{marker}{}", item.display))
            })
            .collect();

        let title = format!(" {} ", app.view_kind.label().to_lowercase());
        let list = List::new(visible_items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ratatui::widgets::ListState::default();
        if total > 0 {
            state.select(Some(selected_pos_in_visible));
        }
        frame.render_stateful_widget(list, chunks[2], &mut state);
    }

    // Footer
    let footer = Paragraph::new(controls_text(scrub_seconds))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[3]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_mmss_pads_minutes_and_seconds() {
        assert_eq!(format_mmss(Duration::ZERO), "00:00");
        assert_eq!(format_mmss(Duration::from_secs(65)), "01:05");
        assert_eq!(format_mmss(Duration::from_secs(600)), "10:00");
    }

    #[test]
    fn controls_text_mentions_scrub_step() {
        assert!(controls_text(15).contains("-/+15s"));
    }
}
