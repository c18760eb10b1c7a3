// src/application/note_editor.rs
use crate::application::NotesApi;
use crate::domain::{DomainError, Note, NoteDraft, NotePatch};
use chrono::Timelike;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Format a wall-clock time as a 12-hour label, e.g. `10:45 AM`
pub fn format_clock<T: Timelike>(time: &T) -> String {
    let (pm, hour) = time.hour12();
    format!(
        "{}:{:02} {}",
        hour,
        time.minute(),
        if pm { "PM" } else { "AM" }
    )
}

/// Creates new notes and saves edits to existing ones
pub struct NoteEditor<A: NotesApi> {
    api: A,
}

impl<A: NotesApi> NoteEditor<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// Fetch a note to pre-fill the editor
    pub fn open(&mut self, note_id: i64) -> Result<Note, DomainError> {
        self.api.get_note(note_id)
    }

    /// Validate and persist a draft. Without an id the note is created,
    /// otherwise both fields of the existing note are replaced.
    pub fn save(&mut self, existing_id: Option<i64>, draft: NoteDraft) -> Result<Note, DomainError> {
        draft.validate()?;

        let note = match existing_id {
            None => self.api.create_note(&draft)?,
            Some(id) => self.api.update_note(id, &NotePatch::from(draft))?,
        };
        info!(note_id = note.id, "Note saved");
        Ok(note)
    }

    /// Apply a partial update; an empty patch is rejected like an empty draft
    pub fn patch(&mut self, note_id: i64, patch: NotePatch) -> Result<Note, DomainError> {
        if patch.is_empty() {
            return Err(DomainError::EmptyNote);
        }
        let current = self.api.get_note(note_id)?;
        let merged = NoteDraft::new(
            patch.title.clone().unwrap_or(current.title),
            patch.content.clone().unwrap_or(current.content),
        );
        merged.validate()?;

        let note = self.api.update_note(note_id, &patch)?;
        info!(note_id = note.id, "Note updated");
        Ok(note)
    }
}

/// Fixed-interval ticker refreshing the "Last saved" label while a draft is
/// open. It only recomputes the label and never writes to the backend.
#[derive(Debug, Clone)]
pub struct AutosaveTimer {
    interval: Duration,
    last_tick: Instant,
    last_saved: Option<String>,
}

impl AutosaveTimer {
    pub fn new(interval: Duration, started: Instant) -> Self {
        Self {
            interval,
            last_tick: started,
            last_saved: None,
        }
    }

    /// Seed the label, e.g. from the note's last update time
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.last_saved = Some(label.into());
        self
    }

    pub fn last_saved(&self) -> Option<&str> {
        self.last_saved.as_deref()
    }

    /// Returns the refreshed label when an interval has elapsed and the
    /// draft has any text in it
    pub fn poll<T: Timelike>(
        &mut self,
        now: Instant,
        clock: &T,
        draft: &NoteDraft,
    ) -> Option<&str> {
        if now.saturating_duration_since(self.last_tick) < self.interval {
            return None;
        }
        self.last_tick = now;

        if draft.title.is_empty() && draft.content.is_empty() {
            return None;
        }
        let label = format_clock(clock);
        debug!(%label, "Autosave tick");
        self.last_saved = Some(label);
        self.last_saved.as_deref()
    }
}
