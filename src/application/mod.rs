// src/application/mod.rs
pub mod auth;
pub mod gateway;
pub mod note_deleter;
pub mod note_editor;
pub mod note_lister;
pub mod note_viewer;

pub use auth::{AuthService, SessionStore};
pub use gateway::{AuthApi, NotesApi};
pub use note_deleter::NoteDeleter;
pub use note_editor::{format_clock, AutosaveTimer, NoteEditor};
pub use note_lister::{filter_notes, NoteLister};
pub use note_viewer::NoteViewer;
