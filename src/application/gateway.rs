// src/application/gateway.rs
use crate::domain::{
    AuthResponse, DomainError, LoginCredentials, Note, NoteDraft, NotePage, NotePatch,
    ProfileUpdate, Registration, User,
};

/// Account endpoints of the backend
pub trait AuthApi {
    fn register(&mut self, registration: &Registration) -> Result<AuthResponse, DomainError>;

    fn login(&mut self, credentials: &LoginCredentials) -> Result<AuthResponse, DomainError>;

    fn profile(&mut self) -> Result<User, DomainError>;

    fn update_profile(&mut self, update: &ProfileUpdate) -> Result<User, DomainError>;
}

/// Notes endpoints of the backend, scoped to the authenticated user
pub trait NotesApi {
    /// Fetch one page of the listing, pages start at 1
    fn list_page(&mut self, page: u32) -> Result<NotePage, DomainError>;

    /// Fetch every note in a single oversized page
    fn list_all(&mut self) -> Result<Vec<Note>, DomainError>;

    fn get_note(&mut self, id: i64) -> Result<Note, DomainError>;

    fn create_note(&mut self, draft: &NoteDraft) -> Result<Note, DomainError>;

    fn update_note(&mut self, id: i64, patch: &NotePatch) -> Result<Note, DomainError>;

    fn delete_note(&mut self, id: i64) -> Result<(), DomainError>;
}

impl<T: AuthApi + ?Sized> AuthApi for &mut T {
    fn register(&mut self, registration: &Registration) -> Result<AuthResponse, DomainError> {
        (**self).register(registration)
    }

    fn login(&mut self, credentials: &LoginCredentials) -> Result<AuthResponse, DomainError> {
        (**self).login(credentials)
    }

    fn profile(&mut self) -> Result<User, DomainError> {
        (**self).profile()
    }

    fn update_profile(&mut self, update: &ProfileUpdate) -> Result<User, DomainError> {
        (**self).update_profile(update)
    }
}

impl<T: NotesApi + ?Sized> NotesApi for &mut T {
    fn list_page(&mut self, page: u32) -> Result<NotePage, DomainError> {
        (**self).list_page(page)
    }

    fn list_all(&mut self) -> Result<Vec<Note>, DomainError> {
        (**self).list_all()
    }

    fn get_note(&mut self, id: i64) -> Result<Note, DomainError> {
        (**self).get_note(id)
    }

    fn create_note(&mut self, draft: &NoteDraft) -> Result<Note, DomainError> {
        (**self).create_note(draft)
    }

    fn update_note(&mut self, id: i64, patch: &NotePatch) -> Result<Note, DomainError> {
        (**self).update_note(id, patch)
    }

    fn delete_note(&mut self, id: i64) -> Result<(), DomainError> {
        (**self).delete_note(id)
    }
}
