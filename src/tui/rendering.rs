use chrono::{DateTime, Utc};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};

use super::app::{MessageType, StatusMessage};
use super::layout::AppLayout;
use super::timestamps::format_timestamp_at;
use crate::models::{HistoryEntry, HistoryKind};
use crate::utils::{sanitize_for_terminal, single_line};

const MUTED: Color = Color::Rgb(113, 113, 122);
const BRIGHT: Color = Color::Rgb(250, 250, 250);
const ACCENT: Color = Color::Rgb(16, 185, 129);
const ERROR: Color = Color::Rgb(239, 68, 68);
const BAR_BG: Color = Color::Rgb(24, 24, 27);

/// Characters of content shown per list row
const LIST_PREVIEW_CHARS: usize = 60;

/// Everything besides the entry list that a frame needs
pub struct RenderState<'a> {
    pub kind: HistoryKind,
    pub search_query: &'a str,
    pub total_count: usize,
    pub status_message: Option<&'a StatusMessage>,
    pub now: DateTime<Utc>,
}

/// Render the entire UI
pub fn render_ui(
    frame: &mut Frame,
    entries: &[&HistoryEntry],
    selected_idx: usize,
    state: &RenderState,
) {
    let layout = AppLayout::new(frame.area());

    render_tabs(frame, layout.tabs_area, state.kind, state.search_query);
    render_results_list(frame, layout.results_area, entries, selected_idx, &state.now);
    render_preview(frame, layout.preview_area, entries.get(selected_idx).copied(), &state.now);
    render_status_bar(frame, layout.status_area, entries.len(), selected_idx, state);
}

fn render_tabs(frame: &mut Frame, area: Rect, active: HistoryKind, search_query: &str) {
    let mut spans = Vec::new();
    for kind in HistoryKind::ALL {
        let style = if kind == active {
            Style::default().fg(BRIGHT).bg(ACCENT).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(MUTED)
        };
        spans.push(Span::styled(format!(" {} ", kind), style));
        spans.push(Span::raw(" "));
    }
    spans.push(Span::styled("Search: ", Style::default().fg(MUTED)));
    spans.push(Span::raw(search_query.to_string()));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_results_list(
    frame: &mut Frame,
    area: Rect,
    entries: &[&HistoryEntry],
    selected_idx: usize,
    now: &DateTime<Utc>,
) {
    let items: Vec<ListItem> = entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let icon = match entry.kind {
                HistoryKind::Generated => "▣",
                HistoryKind::Scanned => "◎",
            };

            let timestamp = format_timestamp_at(&entry.timestamp, now);
            let preview_text =
                single_line(&entry.content).chars().take(LIST_PREVIEW_CHARS).collect::<String>();

            let content = format!("{} {:>9} | {}", icon, timestamp, preview_text);

            let style = if idx == selected_idx {
                Style::default().fg(BRIGHT).bg(ACCENT).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(MUTED)
            };

            ListItem::new(content).style(style)
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(MUTED))
            .title(" History "),
    );

    frame.render_widget(list, area);
}

fn render_preview(frame: &mut Frame, area: Rect, entry: Option<&HistoryEntry>, now: &DateTime<Utc>) {
    let content = if let Some(entry) = entry {
        let label = |text: &'static str| Span::styled(text, Style::default().fg(MUTED));
        let image = match &entry.artifact {
            Some(artifact) if !artifact.is_empty() => "stored (PNG)",
            _ => "none",
        };

        let mut lines = vec![
            Line::from(vec![
                label("When: "),
                Span::raw(format!(
                    "{} ({})",
                    format_timestamp_at(&entry.timestamp, now),
                    entry.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
                )),
            ]),
            Line::from(vec![label("Type: "), Span::raw(entry.kind.to_string())]),
            Line::from(vec![label("Image: "), Span::raw(image)]),
            Line::from(vec![label("Id: "), Span::raw(single_line(&entry.id))]),
            Line::from(""),
        ];

        for line in sanitize_for_terminal(&entry.content).lines() {
            lines.push(Line::from(line.to_string()));
        }

        Text::from(lines)
    } else {
        Text::from("No entry selected")
    };

    let paragraph = Paragraph::new(content)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(MUTED))
                .title(" Content "),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, area);
}

fn render_status_bar(
    frame: &mut Frame,
    area: Rect,
    matched_count: usize,
    selected_idx: usize,
    state: &RenderState,
) {
    let bar = Style::default().bg(BAR_BG);

    let (status_text, style) = if let Some(message) = state.status_message {
        let fg = match message.message_type {
            MessageType::Success => ACCENT,
            MessageType::Error => ERROR,
        };
        (format!(" {} ", message.text), bar.fg(fg))
    } else if matched_count == 0 {
        let text = if state.total_count == 0 {
            format!(" No {} history | Tab: switch | Ctrl+C: quit ", state.kind)
        } else {
            " No matches | Esc: clear | Ctrl+C: quit ".to_string()
        };
        (text, bar.fg(BRIGHT))
    } else {
        let mut parts = vec![];

        if matched_count < state.total_count {
            parts.push(format!("{}/{} matching", matched_count, state.total_count));
        } else {
            parts.push(format!("{} entries", state.total_count));
        }
        parts.push(format!("entry {}/{}", selected_idx + 1, matched_count));

        if !state.search_query.is_empty() {
            parts.push("Esc: clear".to_string());
        }
        parts.push("Tab: switch".to_string());
        parts.push("Ctrl+Y: copy".to_string());
        parts.push("Ctrl+C: quit".to_string());

        (format!(" {} ", parts.join(" | ")), bar.fg(BRIGHT))
    };

    frame.render_widget(Paragraph::new(status_text).style(style), area);
}
