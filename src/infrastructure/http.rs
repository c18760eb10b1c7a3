// src/infrastructure/http.rs
use crate::application::{AuthApi, NotesApi};
use crate::constants::ALL_NOTES_PAGE_SIZE;
use crate::domain::error::DEFAULT_SERVER_MESSAGE;
use crate::domain::note::NoteListing;
use crate::domain::{
    AuthResponse, DomainError, LoginCredentials, Note, NoteDraft, NotePage, NotePatch,
    ProfileUpdate, Registration, User,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use ureq::{Agent, AgentBuilder, ErrorKind, Request, Response};

/// Fields checked, in order, for a human-readable message in an error body
const MESSAGE_FIELDS: [&str; 3] = ["message", "error", "detail"];

/// Translate a failed call into one of the three error categories:
/// the server answered with an error, no answer came back, or something
/// went wrong locally before a request could be made.
pub fn translate_error(error: ureq::Error) -> DomainError {
    match error {
        ureq::Error::Status(status, response) => {
            let body = response.into_string().unwrap_or_default();
            status_error(status, &body)
        }
        ureq::Error::Transport(transport) => match transport.kind() {
            ErrorKind::InvalidUrl | ErrorKind::UnknownScheme | ErrorKind::InvalidProxyUrl => {
                DomainError::unexpected(transport.to_string())
            }
            _ => {
                debug!(error = %transport, "No response received");
                DomainError::Network
            }
        },
    }
}

/// Build the error for a status response from its raw body
pub fn status_error(status: u16, body: &str) -> DomainError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| server_message(&value))
        .unwrap_or_else(|| DEFAULT_SERVER_MESSAGE.to_string());
    warn!(status, %message, "Server responded with error");
    DomainError::Api { status, message }
}

fn server_message(body: &Value) -> Option<String> {
    MESSAGE_FIELDS.iter().find_map(|field| {
        body.get(field)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

/// A 404 from a per-note endpoint means the note is gone or not ours
fn note_not_found(id: i64) -> impl Fn(DomainError) -> DomainError {
    move |err| match err {
        DomainError::Api { status: 404, .. } => DomainError::NoteNotFound(id),
        other => other,
    }
}

fn decode<T: DeserializeOwned>(response: Response) -> Result<T, DomainError> {
    response
        .into_json::<T>()
        .map_err(|e| DomainError::unexpected(format!("Invalid response from server: {e}")))
}

/// Blocking JSON client for the notes backend
#[derive(Debug, Clone)]
pub struct HttpApi {
    agent: Agent,
    base_url: String,
    access_token: Option<String>,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let agent = AgentBuilder::new().timeout(timeout).build();
        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!(%base_url, ?timeout, "Creating HTTP client");
        Self {
            agent,
            base_url,
            access_token: None,
        }
    }

    /// Send `Authorization: Bearer <token>` with every request
    pub fn with_access_token(mut self, token: Option<String>) -> Self {
        self.access_token = token;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: &str, path: &str) -> Request {
        let url = format!("{}{}", self.base_url, path);
        let request = self
            .agent
            .request(method, &url)
            .set("Accept", "application/json");
        match &self.access_token {
            Some(token) => request.set("Authorization", &format!("Bearer {token}")),
            None => request,
        }
    }

    fn call(&self, method: &str, path: &str) -> Result<Response, DomainError> {
        debug!(method, path, "Sending request");
        self.request(method, path).call().map_err(translate_error)
    }

    fn send<B: Serialize>(&self, method: &str, path: &str, body: &B) -> Result<Response, DomainError> {
        debug!(method, path, "Sending request with body");
        self.request(method, path)
            .send_json(body)
            .map_err(translate_error)
    }
}

impl AuthApi for HttpApi {
    #[instrument(level = "debug", skip_all, fields(email = %registration.email))]
    fn register(&mut self, registration: &Registration) -> Result<AuthResponse, DomainError> {
        decode(self.send("POST", "/auth/register/", registration)?)
    }

    #[instrument(level = "debug", skip_all, fields(email = %credentials.email))]
    fn login(&mut self, credentials: &LoginCredentials) -> Result<AuthResponse, DomainError> {
        decode(self.send("POST", "/auth/login/", credentials)?)
    }

    #[instrument(level = "debug", skip(self))]
    fn profile(&mut self) -> Result<User, DomainError> {
        decode(self.call("GET", "/auth/profile/")?)
    }

    #[instrument(level = "debug", skip(self))]
    fn update_profile(&mut self, update: &ProfileUpdate) -> Result<User, DomainError> {
        decode(self.send("PATCH", "/auth/profile/", update)?)
    }
}

impl NotesApi for HttpApi {
    #[instrument(level = "debug", skip(self))]
    fn list_page(&mut self, page: u32) -> Result<NotePage, DomainError> {
        let listing: NoteListing = decode(self.call("GET", &format!("/notes/?page={page}"))?)?;
        Ok(listing.into())
    }

    #[instrument(level = "debug", skip(self))]
    fn list_all(&mut self) -> Result<Vec<Note>, DomainError> {
        let path = format!("/notes/?page_size={ALL_NOTES_PAGE_SIZE}");
        let listing: NoteListing = decode(self.call("GET", &path)?)?;
        Ok(NotePage::from(listing).results)
    }

    #[instrument(level = "debug", skip(self))]
    fn get_note(&mut self, id: i64) -> Result<Note, DomainError> {
        let response = self
            .call("GET", &format!("/notes/{id}/"))
            .map_err(note_not_found(id))?;
        decode(response)
    }

    #[instrument(level = "debug", skip_all)]
    fn create_note(&mut self, draft: &NoteDraft) -> Result<Note, DomainError> {
        decode(self.send("POST", "/notes/", draft)?)
    }

    #[instrument(level = "debug", skip(self, patch))]
    fn update_note(&mut self, id: i64, patch: &NotePatch) -> Result<Note, DomainError> {
        let response = self
            .send("PATCH", &format!("/notes/{id}/"), patch)
            .map_err(note_not_found(id))?;
        decode(response)
    }

    #[instrument(level = "debug", skip(self))]
    fn delete_note(&mut self, id: i64) -> Result<(), DomainError> {
        self.call("DELETE", &format!("/notes/{id}/"))
            .map_err(note_not_found(id))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(r#"{"message":"Bad title"}"#, "Bad title")]
    #[case(r#"{"error":"Invalid token","detail":"ignored"}"#, "Invalid token")]
    #[case(r#"{"detail":"Authentication credentials were not provided."}"#, "Authentication credentials were not provided.")]
    #[case(r#"{"message":"","detail":"Not found."}"#, "Not found.")]
    #[case(r#"{"title":["This field is required."]}"#, DEFAULT_SERVER_MESSAGE)]
    #[case("<html>Server Error</html>", DEFAULT_SERVER_MESSAGE)]
    #[case("", DEFAULT_SERVER_MESSAGE)]
    fn given_error_body_when_translating_status_then_picks_first_message_field(
        #[case] body: &str,
        #[case] expected: &str,
    ) {
        match status_error(400, body) {
            DomainError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, expected);
            }
            other => panic!("Expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn given_not_found_api_error_when_mapping_note_error_then_becomes_note_not_found() {
        let mapped = note_not_found(5)(DomainError::Api {
            status: 404,
            message: "Not found.".to_string(),
        });
        assert_eq!(mapped, DomainError::NoteNotFound(5));
    }

    #[test]
    fn given_other_error_when_mapping_note_error_then_passes_through() {
        assert_eq!(note_not_found(5)(DomainError::Network), DomainError::Network);
    }

    #[test]
    fn given_trailing_slash_when_creating_client_then_trims_base_url() {
        let api = HttpApi::new("http://localhost:8000/api/", Duration::from_secs(1));
        assert_eq!(api.base_url(), "http://localhost:8000/api");
    }

    #[test]
    fn given_malformed_url_when_calling_then_reports_unexpected_failure() {
        let mut api = HttpApi::new("not a url", Duration::from_secs(1));
        assert!(matches!(api.profile(), Err(DomainError::Unexpected(_))));
    }
}
