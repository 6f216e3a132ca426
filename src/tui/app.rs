//! Browser state and event loop.
//!
//! The `App` owns both histories and shows one at a time. Typing narrows the list with the
//! same case-insensitive substring match as `HistoryStore::search`; Tab switches between
//! generation and scan history; Ctrl+R reloads both from storage.

use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Utc;
use ratatui::Terminal;
use ratatui::backend::Backend;

use super::events::{Action, poll_event};
use super::rendering::{RenderState, render_ui};
use crate::clipboard::copy_to_clipboard;
use crate::models::{HistoryEntry, HistoryKind};
use crate::store::{Histories, KeyValueStore};

/// Duration for success status messages (milliseconds)
const STATUS_SUCCESS_DURATION_MS: u64 = 3000;
/// Duration for error status messages (milliseconds)
const STATUS_ERROR_DURATION_MS: u64 = 5000;
/// Longest search query accepted from the keyboard
const MAX_QUERY_LEN: usize = 256;

/// Type of status message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Success,
    Error,
}

/// Transient status message with expiry
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub message_type: MessageType,
    pub expires_at: Instant,
}

type CopyFn = fn(&str) -> Result<()>;

pub struct App<S> {
    histories: Histories<S>,
    kind: HistoryKind,
    selected_idx: usize,
    search_query: String,
    should_quit: bool,
    status_message: Option<StatusMessage>,
    copy: CopyFn,
    needs_redraw: bool,
    last_draw_time: Instant,
}

impl<S: KeyValueStore> App<S> {
    /// Browse `histories`, starting with whichever kind has entries (generation first)
    pub fn new(histories: Histories<S>) -> Self {
        let kind = if histories.generated.is_empty() && !histories.scanned.is_empty() {
            HistoryKind::Scanned
        } else {
            HistoryKind::Generated
        };

        Self {
            histories,
            kind,
            selected_idx: 0,
            search_query: String::new(),
            should_quit: false,
            status_message: None,
            copy: copy_to_clipboard,
            needs_redraw: true,
            last_draw_time: Instant::now(),
        }
    }

    pub fn kind(&self) -> HistoryKind {
        self.kind
    }

    /// Set a transient status message with automatic expiry
    fn set_status(&mut self, text: impl Into<String>, message_type: MessageType, duration_ms: u64) {
        self.status_message = Some(StatusMessage {
            text: text.into(),
            message_type,
            expires_at: Instant::now() + Duration::from_millis(duration_ms),
        });
        self.needs_redraw = true;
    }

    fn check_and_clear_expired_status(&mut self) {
        if self.status_message.as_ref().is_some_and(|msg| Instant::now() >= msg.expires_at) {
            self.status_message = None;
            self.needs_redraw = true;
        }
    }

    /// Entries of the active history matching the query, newest first
    fn matched_entries(&self) -> Vec<&HistoryEntry> {
        self.histories.for_kind(self.kind).search(&self.search_query)
    }

    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        while !self.should_quit {
            self.check_and_clear_expired_status();

            // Draw if dirty or if it's been >100ms (for terminal resize handling)
            let now = Instant::now();
            if self.needs_redraw || now.duration_since(self.last_draw_time) >= Duration::from_millis(100) {
                let matched = self.matched_entries();
                let state = RenderState {
                    kind: self.kind,
                    search_query: &self.search_query,
                    total_count: self.histories.for_kind(self.kind).len(),
                    status_message: self.status_message.as_ref(),
                    now: Utc::now(),
                };
                terminal.draw(|f| render_ui(f, &matched, self.selected_idx, &state))?;
                self.needs_redraw = false;
                self.last_draw_time = now;
            }

            let action = poll_event(Duration::from_millis(100))?;
            self.handle_action(action);
        }

        Ok(())
    }

    fn handle_action(&mut self, action: Action) {
        let total = self.matched_entries().len();

        match action {
            Action::Quit => self.should_quit = true,
            Action::ClearSearch => {
                if self.search_query.is_empty() {
                    self.should_quit = true;
                } else {
                    self.search_query.clear();
                    self.selected_idx = 0;
                    self.needs_redraw = true;
                }
            }
            Action::MoveUp => self.move_selection(-1, total),
            Action::MoveDown => self.move_selection(1, total),
            Action::PageUp => self.move_selection(-10, total),
            Action::PageDown => self.move_selection(10, total),
            Action::UpdateSearch(c) => self.update_search(c),
            Action::DeleteChar => self.delete_char(),
            Action::SwitchHistory => {
                self.kind = self.kind.other();
                self.selected_idx = 0;
                self.needs_redraw = true;
            }
            Action::Reload => {
                self.histories.generated.load();
                self.histories.scanned.load();
                self.selected_idx = 0;
                self.set_status("✓ Reloaded history", MessageType::Success, STATUS_SUCCESS_DURATION_MS);
            }
            Action::CopyToClipboard => self.copy_selected(),
            Action::None => {}
        }
    }

    fn copy_selected(&mut self) {
        let selected = self.matched_entries().get(self.selected_idx).map(|e| e.content.clone());
        let Some(content) = selected else {
            self.set_status("✗ No entry to copy", MessageType::Error, STATUS_ERROR_DURATION_MS);
            return;
        };

        match (self.copy)(&content) {
            Ok(()) => {
                self.set_status("✓ Copied to clipboard", MessageType::Success, STATUS_SUCCESS_DURATION_MS)
            }
            Err(e) => self.set_status(
                format!("✗ Clipboard error: {}", e),
                MessageType::Error,
                STATUS_ERROR_DURATION_MS,
            ),
        }
    }

    fn move_selection(&mut self, delta: isize, total: usize) {
        if total == 0 {
            self.selected_idx = 0;
            return;
        }

        let old_idx = self.selected_idx;
        let new_idx = (self.selected_idx as isize + delta).max(0) as usize;
        self.selected_idx = new_idx.min(total - 1);

        if old_idx != self.selected_idx {
            self.needs_redraw = true;
        }
    }

    fn update_search(&mut self, c: char) {
        if self.search_query.len() < MAX_QUERY_LEN {
            self.search_query.push(c);
            self.selected_idx = 0;
            self.needs_redraw = true;
        }
    }

    fn delete_char(&mut self) {
        if self.search_query.pop().is_some() {
            self.selected_idx = 0;
            self.needs_redraw = true;
        }
    }
}
