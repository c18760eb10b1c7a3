// src/application/note_deleter.rs
use crate::application::NotesApi;
use crate::domain::DomainError;

pub struct NoteDeleter<A: NotesApi> {
    api: A,
}

impl<A: NotesApi> NoteDeleter<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn delete_note(&mut self, note_id: i64) -> Result<(), DomainError> {
        self.api.delete_note(note_id)
    }
}
