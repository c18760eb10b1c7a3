// src/application/note_lister.rs
use crate::application::NotesApi;
use crate::domain::{DomainError, Note, NotePage};
use tracing::debug;

/// Keep notes whose title or content contains `query`, ignoring case.
/// A missing or blank query keeps everything.
pub fn filter_notes(notes: Vec<Note>, query: Option<&str>) -> Vec<Note> {
    match query.map(str::trim).filter(|q| !q.is_empty()) {
        None => notes,
        Some(query) => notes.into_iter().filter(|n| n.matches(query)).collect(),
    }
}

pub struct NoteLister<A: NotesApi> {
    api: A,
}

impl<A: NotesApi> NoteLister<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// Fetch a single page of the listing, page numbers start at 1
    pub fn list_page(&mut self, page: u32) -> Result<NotePage, DomainError> {
        self.api.list_page(page.max(1))
    }

    /// Re-fetch every note and apply the search filter
    ///
    /// # Arguments
    /// * `search_query` - Optional term matched against title and content
    pub fn list_notes(&mut self, search_query: Option<&str>) -> Result<Vec<Note>, DomainError> {
        let notes = self.api.list_all()?;
        let total = notes.len();
        let filtered = filter_notes(notes, search_query);
        debug!(total, shown = filtered.len(), ?search_query, "Listed notes");
        Ok(filtered)
    }
}
