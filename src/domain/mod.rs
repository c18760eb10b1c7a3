// src/domain/mod.rs
pub mod auth;
pub mod error;
pub mod note;

pub use auth::{AuthResponse, LoginCredentials, ProfileUpdate, Registration, User};
pub use error::DomainError;
pub use note::{Note, NoteDraft, NotePage, NotePatch};
