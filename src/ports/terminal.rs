// src/ports/terminal.rs
use crate::application::format_clock;
use crate::constants::PREVIEW_CHARS;
use crate::domain::{Note, NotePage, User};
use crate::util::text::{preview, relative_date};
use chrono::{DateTime, TimeZone};
use std::fmt::Display;

const UNTITLED: &str = "Untitled";

/// Plain-text rendering of notes and accounts for the terminal
#[derive(Debug, Clone)]
pub struct TerminalPresenter {
    preview_chars: usize,
}

impl TerminalPresenter {
    pub fn new() -> Self {
        Self {
            preview_chars: PREVIEW_CHARS,
        }
    }

    pub fn with_preview_chars(preview_chars: usize) -> Self {
        Self { preview_chars }
    }

    /// Two lines per note: id, title and age, then a content preview
    pub fn render_row<Tz: TimeZone>(&self, note: &Note, now: &DateTime<Tz>) -> String {
        let updated = note.updated_at.with_timezone(&now.timezone());
        let mut row = format!(
            "[{}] {} ({})",
            note.id,
            title_or_untitled(note),
            relative_date(&updated, now)
        );
        let body = preview(&note.content, self.preview_chars);
        if !body.is_empty() {
            row.push_str("\n    ");
            row.push_str(&body);
        }
        row
    }

    pub fn render_list<Tz: TimeZone>(&self, notes: &[Note], now: &DateTime<Tz>) -> String {
        if notes.is_empty() {
            return "No notes found.".to_string();
        }
        notes
            .iter()
            .map(|note| self.render_row(note, now))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// A listing page followed by a position footer
    pub fn render_page<Tz: TimeZone>(&self, page: &NotePage, number: u32, now: &DateTime<Tz>) -> String {
        let mut out = self.render_list(&page.results, now);
        out.push_str(&format!(
            "\n\nPage {}: {} of {} notes",
            number,
            page.results.len(),
            page.count
        ));
        if page.next.is_some() {
            out.push_str(&format!(" (next: --page {})", number + 1));
        }
        out
    }

    pub fn render_note<Tz: TimeZone>(&self, note: &Note, now: &DateTime<Tz>) -> String
    where
        Tz::Offset: Display,
    {
        let title = title_or_untitled(note);
        let created = note.created_at.with_timezone(&now.timezone());
        let updated = note.updated_at.with_timezone(&now.timezone());
        format!(
            "{title}\n{rule}\n\n{content}\n\nNote ID: {id}\nCreated: {created}\nLast saved: {saved} ({ago})",
            rule = "=".repeat(title.chars().count()),
            content = note.content,
            id = note.id,
            created = created.format("%B %-d, %Y %H:%M"),
            saved = format_clock(&updated),
            ago = relative_date(&updated, now),
        )
    }

    pub fn render_user(&self, user: &User) -> String {
        format!(
            "{} <{}>\nUsername: {}\nUser ID: {}",
            user.display_name(),
            user.email,
            user.username,
            user.id
        )
    }
}

impl Default for TerminalPresenter {
    fn default() -> Self {
        Self::new()
    }
}

fn title_or_untitled(note: &Note) -> &str {
    let title = note.title.trim();
    if title.is_empty() {
        UNTITLED
    } else {
        title
    }
}
