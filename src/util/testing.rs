// src/util/testing.rs

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::env;
use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::application::{AuthApi, NotesApi, SessionStore};
use crate::constants::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY};
use crate::domain::{
    AuthResponse, DomainError, LoginCredentials, Note, NoteDraft, NotePage, NotePatch,
    ProfileUpdate, Registration, User,
};

/// 2024-10-26 10:45:00 UTC, the timestamp every fixture note starts from
pub const FIXTURE_EPOCH_SECS: i64 = 1_729_939_500;

pub fn fixture_time() -> DateTime<Utc> {
    DateTime::from_timestamp(FIXTURE_EPOCH_SECS, 0).unwrap_or_default()
}

pub fn note_fixture(id: i64, title: &str, content: &str) -> Note {
    Note {
        id,
        title: title.to_string(),
        content: content.to_string(),
        created_at: fixture_time(),
        updated_at: fixture_time(),
        user: Some(1),
    }
}

pub fn user_fixture() -> User {
    User {
        id: 1,
        email: "ada@example.com".to_string(),
        username: "ada".to_string(),
        first_name: Some("Ada".to_string()),
        last_name: Some("Lovelace".to_string()),
    }
}

pub fn auth_response_fixture() -> AuthResponse {
    AuthResponse {
        access: "access-token".to_string(),
        refresh: "refresh-token".to_string(),
        user: user_fixture(),
    }
}

/// In-memory notes backend for testing use cases that depend on NotesApi
///
/// Keeps notes in insertion order, hands out ids on create, and records the
/// name of every call so tests can assert which endpoints were hit.
///
/// # Examples
///
/// ```
/// use notesync::util::testing::{note_fixture, MockNotesApi};
///
/// let mock = MockNotesApi::builder()
///     .with_note(note_fixture(1, "Project Ideas", "Q3 campaign"))
///     .with_page_size(10)
///     .build();
/// assert_eq!(mock.notes().len(), 1);
/// ```
#[derive(Debug)]
pub struct MockNotesApi {
    notes: Vec<Note>,
    page_size: usize,
    failure: Option<DomainError>,
    next_id: i64,
    calls: Vec<String>,
}

impl MockNotesApi {
    pub fn builder() -> MockNotesApiBuilder {
        MockNotesApiBuilder::new()
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn calls(&self) -> &[String] {
        &self.calls
    }

    fn record(&mut self, call: impl Into<String>) -> Result<(), DomainError> {
        self.calls.push(call.into());
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn position(&self, id: i64) -> Result<usize, DomainError> {
        self.notes
            .iter()
            .position(|n| n.id == id)
            .ok_or(DomainError::NoteNotFound(id))
    }
}

impl NotesApi for MockNotesApi {
    fn list_page(&mut self, page: u32) -> Result<NotePage, DomainError> {
        self.record(format!("list_page({page})"))?;
        let start = (page.max(1) as usize - 1) * self.page_size;
        let results: Vec<Note> = self
            .notes
            .iter()
            .skip(start)
            .take(self.page_size)
            .cloned()
            .collect();
        let has_next = start + results.len() < self.notes.len();
        Ok(NotePage {
            count: self.notes.len() as u64,
            next: has_next.then(|| format!("/notes/?page={}", page + 1)),
            previous: (page > 1).then(|| format!("/notes/?page={}", page - 1)),
            results,
        })
    }

    fn list_all(&mut self) -> Result<Vec<Note>, DomainError> {
        self.record("list_all")?;
        Ok(self.notes.clone())
    }

    fn get_note(&mut self, id: i64) -> Result<Note, DomainError> {
        self.record(format!("get_note({id})"))?;
        let index = self.position(id)?;
        Ok(self.notes[index].clone())
    }

    fn create_note(&mut self, draft: &NoteDraft) -> Result<Note, DomainError> {
        self.record("create_note")?;
        let note = Note {
            id: self.next_id,
            title: draft.title.clone(),
            content: draft.content.clone(),
            created_at: fixture_time(),
            updated_at: fixture_time(),
            user: Some(1),
        };
        self.next_id += 1;
        self.notes.insert(0, note.clone());
        Ok(note)
    }

    fn update_note(&mut self, id: i64, patch: &NotePatch) -> Result<Note, DomainError> {
        self.record(format!("update_note({id})"))?;
        let index = self.position(id)?;
        let note = &mut self.notes[index];
        if let Some(title) = &patch.title {
            note.title = title.clone();
        }
        if let Some(content) = &patch.content {
            note.content = content.clone();
        }
        note.updated_at += Duration::minutes(1);
        Ok(note.clone())
    }

    fn delete_note(&mut self, id: i64) -> Result<(), DomainError> {
        self.record(format!("delete_note({id})"))?;
        let index = self.position(id)?;
        self.notes.remove(index);
        Ok(())
    }
}

/// Builder for MockNotesApi
pub struct MockNotesApiBuilder {
    notes: Vec<Note>,
    page_size: usize,
    failure: Option<DomainError>,
}

impl MockNotesApiBuilder {
    pub fn new() -> Self {
        Self {
            notes: vec![],
            page_size: 20,
            failure: None,
        }
    }

    pub fn with_note(mut self, note: Note) -> Self {
        self.notes.push(note);
        self
    }

    pub fn with_notes(mut self, notes: Vec<Note>) -> Self {
        self.notes.extend(notes);
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Make every call fail with `error` (after being recorded)
    pub fn with_failure(mut self, error: DomainError) -> Self {
        self.failure = Some(error);
        self
    }

    pub fn build(self) -> MockNotesApi {
        let next_id = self.notes.iter().map(|n| n.id).max().unwrap_or(0) + 1;
        MockNotesApi {
            notes: self.notes,
            page_size: self.page_size,
            failure: self.failure,
            next_id,
            calls: vec![],
        }
    }
}

impl Default for MockNotesApiBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Scripted account endpoints
#[derive(Debug)]
pub struct MockAuthApi {
    auth_response: Option<AuthResponse>,
    profile: Option<User>,
    failure: Option<DomainError>,
    calls: Vec<String>,
}

impl MockAuthApi {
    pub fn builder() -> MockAuthApiBuilder {
        MockAuthApiBuilder::default()
    }

    pub fn calls(&self) -> &[String] {
        &self.calls
    }

    fn respond<T: Clone>(&mut self, call: &str, value: Option<T>) -> Result<T, DomainError> {
        self.calls.push(call.to_string());
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        value.ok_or_else(|| DomainError::unexpected(format!("no scripted response for {call}")))
    }
}

impl AuthApi for MockAuthApi {
    fn register(&mut self, _registration: &Registration) -> Result<AuthResponse, DomainError> {
        let response = self.auth_response.clone();
        self.respond("register", response)
    }

    fn login(&mut self, _credentials: &LoginCredentials) -> Result<AuthResponse, DomainError> {
        let response = self.auth_response.clone();
        self.respond("login", response)
    }

    fn profile(&mut self) -> Result<User, DomainError> {
        let profile = self.profile.clone();
        self.respond("profile", profile)
    }

    fn update_profile(&mut self, _update: &ProfileUpdate) -> Result<User, DomainError> {
        let profile = self.profile.clone();
        self.respond("update_profile", profile)
    }
}

/// Builder for MockAuthApi
#[derive(Default)]
pub struct MockAuthApiBuilder {
    auth_response: Option<AuthResponse>,
    profile: Option<User>,
    failure: Option<DomainError>,
}

impl MockAuthApiBuilder {
    /// Response returned by both login and register
    pub fn with_auth_response(mut self, response: AuthResponse) -> Self {
        self.auth_response = Some(response);
        self
    }

    /// User returned by profile and update_profile
    pub fn with_profile(mut self, user: User) -> Self {
        self.profile = Some(user);
        self
    }

    pub fn with_failure(mut self, error: DomainError) -> Self {
        self.failure = Some(error);
        self
    }

    pub fn build(self) -> MockAuthApi {
        MockAuthApi {
            auth_response: self.auth_response,
            profile: self.profile,
            failure: self.failure,
            calls: vec![],
        }
    }
}

/// Session store kept in memory; `failing()` makes every operation error
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    entries: HashMap<String, String>,
    failing: bool,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            entries: HashMap::new(),
            failing: true,
        }
    }

    /// Store pre-populated as after a successful login
    pub fn signed_in(response: &AuthResponse) -> Self {
        let mut entries = HashMap::new();
        entries.insert(ACCESS_TOKEN_KEY.to_string(), response.access.clone());
        entries.insert(REFRESH_TOKEN_KEY.to_string(), response.refresh.clone());
        entries.insert(
            USER_KEY.to_string(),
            serde_json::to_string(&response.user).unwrap_or_default(),
        );
        Self {
            entries,
            failing: false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn check(&self) -> Result<(), DomainError> {
        if self.failing {
            return Err(DomainError::Storage("storage unavailable".to_string()));
        }
        Ok(())
    }
}

impl SessionStore for InMemorySessionStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, DomainError> {
        self.check()?;
        Ok(self.entries.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: String) -> Result<(), DomainError> {
        self.check()?;
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn multi_set(&mut self, entries: &[(&str, String)]) -> Result<(), DomainError> {
        self.check()?;
        for (key, value) in entries {
            self.entries.insert(key.to_string(), value.clone());
        }
        Ok(())
    }

    fn multi_remove(&mut self, keys: &[&str]) -> Result<(), DomainError> {
        self.check()?;
        for key in keys {
            self.entries.remove(*key);
        }
        Ok(())
    }
}

pub fn init_test_setup() -> Result<()> {
    // Set up logging first
    setup_test_logging();

    info!("Test Setup complete");
    Ok(())
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "trace");
    }

    // Create a filter for noisy modules
    let noisy_modules = ["ureq", "rustls", "mio"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[ctor::ctor]
    fn init() {
        init_test_setup().expect("Failed to initialize test setup");
    }

    #[test]
    fn given_notes_when_paging_then_links_neighbouring_pages() {
        let mut mock = MockNotesApi::builder()
            .with_notes((1..=5).map(|i| note_fixture(i, "T", "C")).collect())
            .with_page_size(2)
            .build();

        let page = mock.list_page(2).expect("Page should load");

        assert_eq!(page.results.iter().map(|n| n.id).collect::<Vec<_>>(), [3, 4]);
        assert_eq!(page.previous.as_deref(), Some("/notes/?page=1"));
        assert_eq!(page.next.as_deref(), Some("/notes/?page=3"));
    }

    #[test]
    fn given_existing_ids_when_creating_then_assigns_next_id_first_in_order() {
        let mut mock = MockNotesApi::builder()
            .with_note(note_fixture(9, "T", "C"))
            .build();

        let note = mock.create_note(&NoteDraft::new("New", "")).expect("Create should succeed");

        assert_eq!(note.id, 10);
        assert_eq!(mock.notes()[0].id, 10);
    }

    #[test]
    fn given_failure_configured_when_calling_then_records_and_fails() {
        let mut mock = MockNotesApi::builder()
            .with_failure(DomainError::Network)
            .build();

        assert!(mock.delete_note(1).is_err());
        assert_eq!(mock.calls(), ["delete_note(1)"]);
    }

    #[test]
    fn given_unscripted_auth_when_logging_in_then_returns_unexpected() {
        let mut mock = MockAuthApi::builder().build();
        let credentials = LoginCredentials {
            email: "a@b.c".to_string(),
            password: "x".to_string(),
        };

        assert!(matches!(mock.login(&credentials), Err(DomainError::Unexpected(_))));
    }

    #[test]
    fn given_failing_store_when_reading_then_returns_storage_error() {
        let store = InMemorySessionStore::failing();
        assert!(matches!(store.get_item(USER_KEY), Err(DomainError::Storage(_))));
    }
}
