// src/application/auth.rs
use crate::application::AuthApi;
use crate::constants::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, SESSION_KEYS, USER_KEY};
use crate::domain::{
    AuthResponse, DomainError, LoginCredentials, ProfileUpdate, Registration, User,
};
use tracing::{debug, error, info, warn};

/// Local key-value storage holding the session entries
pub trait SessionStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, DomainError>;

    fn set_item(&mut self, key: &str, value: String) -> Result<(), DomainError>;

    /// Write all entries at once
    fn multi_set(&mut self, entries: &[(&str, String)]) -> Result<(), DomainError>;

    fn multi_remove(&mut self, keys: &[&str]) -> Result<(), DomainError>;
}

impl<T: SessionStore + ?Sized> SessionStore for &mut T {
    fn get_item(&self, key: &str) -> Result<Option<String>, DomainError> {
        (**self).get_item(key)
    }

    fn set_item(&mut self, key: &str, value: String) -> Result<(), DomainError> {
        (**self).set_item(key, value)
    }

    fn multi_set(&mut self, entries: &[(&str, String)]) -> Result<(), DomainError> {
        (**self).multi_set(entries)
    }

    fn multi_remove(&mut self, keys: &[&str]) -> Result<(), DomainError> {
        (**self).multi_remove(keys)
    }
}

/// Read the stored access token. Empty values and unreadable storage count
/// as signed out.
pub fn stored_access_token<S: SessionStore + ?Sized>(store: &S) -> Option<String> {
    match store.get_item(ACCESS_TOKEN_KEY) {
        Ok(token) => token.filter(|token| !token.is_empty()),
        Err(e) => {
            warn!(error = %e, "Session storage unreadable, treating as signed out");
            None
        }
    }
}

pub struct AuthService<A: AuthApi, S: SessionStore> {
    api: A,
    store: S,
}

impl<A: AuthApi, S: SessionStore> AuthService<A, S> {
    pub fn new(api: A, store: S) -> Self {
        Self { api, store }
    }

    pub fn register(&mut self, registration: &Registration) -> Result<AuthResponse, DomainError> {
        debug!(email = %registration.email, "Registering account");
        let response = self.api.register(registration)?;
        self.persist(&response)?;
        info!(user_id = response.user.id, "Registered and signed in");
        Ok(response)
    }

    pub fn login(&mut self, credentials: &LoginCredentials) -> Result<AuthResponse, DomainError> {
        debug!(email = %credentials.email, "Logging in");
        let response = self.api.login(credentials)?;
        self.persist(&response)?;
        info!(user_id = response.user.id, "Signed in");
        Ok(response)
    }

    /// Clear the session; storage failures are logged, never returned
    pub fn logout(&mut self) {
        match self.store.multi_remove(&SESSION_KEYS) {
            Ok(()) => info!("Signed out"),
            Err(e) => error!(error = %e, "Logout error"),
        }
    }

    /// The user record saved at sign-in, if any
    pub fn current_user(&self) -> Option<User> {
        let raw = match self.store.get_item(USER_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                error!(error = %e, "Get current user error");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                error!(error = %e, "Get current user error");
                None
            }
        }
    }

    pub fn profile(&mut self) -> Result<User, DomainError> {
        self.api.profile()
    }

    pub fn update_profile(&mut self, update: &ProfileUpdate) -> Result<User, DomainError> {
        let user = self.api.update_profile(update)?;
        self.store.set_item(USER_KEY, encode_user(&user)?)?;
        debug!(user_id = user.id, "Stored updated profile");
        Ok(user)
    }

    pub fn is_authenticated(&self) -> bool {
        stored_access_token(&self.store).is_some()
    }

    /// Gate for commands that act on the signed-in account
    pub fn require_session(&self) -> Result<(), DomainError> {
        if self.is_authenticated() {
            Ok(())
        } else {
            Err(DomainError::NotAuthenticated)
        }
    }

    fn persist(&mut self, response: &AuthResponse) -> Result<(), DomainError> {
        let entries = [
            (ACCESS_TOKEN_KEY, response.access.clone()),
            (REFRESH_TOKEN_KEY, response.refresh.clone()),
            (USER_KEY, encode_user(&response.user)?),
        ];
        self.store.multi_set(&entries)
    }
}

fn encode_user(user: &User) -> Result<String, DomainError> {
    serde_json::to_string(user).map_err(|e| DomainError::unexpected(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::testing::{auth_response_fixture, InMemorySessionStore, MockAuthApi};

    fn credentials() -> LoginCredentials {
        LoginCredentials {
            email: "ada@example.com".to_string(),
            password: "secret".to_string(),
        }
    }

    #[test]
    fn given_valid_credentials_when_logging_in_then_stores_three_session_entries() {
        // Arrange
        let mut api = MockAuthApi::builder()
            .with_auth_response(auth_response_fixture())
            .build();
        let mut store = InMemorySessionStore::new();
        let mut service = AuthService::new(&mut api, &mut store);

        // Act
        let response = service.login(&credentials()).expect("Login should succeed");

        // Assert
        assert_eq!(response.access, "access-token");
        assert!(service.is_authenticated());
        assert_eq!(store.len(), 3);
        assert_eq!(
            store.get_item(REFRESH_TOKEN_KEY).unwrap().as_deref(),
            Some("refresh-token")
        );
        assert!(store.get_item(USER_KEY).unwrap().unwrap().contains("ada@example.com"));
    }

    #[test]
    fn given_rejected_credentials_when_logging_in_then_stores_nothing() {
        // Arrange
        let mut api = MockAuthApi::builder()
            .with_failure(DomainError::Api {
                status: 401,
                message: "No active account found with the given credentials".to_string(),
            })
            .build();
        let mut store = InMemorySessionStore::new();
        let mut service = AuthService::new(&mut api, &mut store);

        // Act
        let result = service.login(&credentials());

        // Assert
        assert!(matches!(result, Err(DomainError::Api { status: 401, .. })));
        assert!(!service.is_authenticated());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn given_registration_when_registering_then_signs_in() {
        let mut api = MockAuthApi::builder()
            .with_auth_response(auth_response_fixture())
            .build();
        let mut service = AuthService::new(&mut api, InMemorySessionStore::new());
        let registration = Registration {
            email: "ada@example.com".to_string(),
            username: "ada".to_string(),
            password: "secret".to_string(),
            password2: "secret".to_string(),
            first_name: Some("Ada".to_string()),
            last_name: None,
        };

        service.register(&registration).expect("Register should succeed");

        assert!(service.is_authenticated());
        assert_eq!(service.current_user().map(|u| u.username), Some("ada".to_string()));
        assert_eq!(api.calls(), ["register"]);
    }

    #[test]
    fn given_signed_in_session_when_logging_out_then_removes_all_entries() {
        let mut store = InMemorySessionStore::signed_in(&auth_response_fixture());
        let mut service = AuthService::new(MockAuthApi::builder().build(), &mut store);

        service.logout();

        assert!(!service.is_authenticated());
        assert!(service.current_user().is_none());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn given_failing_storage_when_logging_out_then_does_not_fail() {
        let store = InMemorySessionStore::failing();
        let mut service = AuthService::new(MockAuthApi::builder().build(), store);

        service.logout();

        assert!(!service.is_authenticated());
    }

    #[test]
    fn given_corrupt_user_entry_when_reading_current_user_then_returns_none() {
        let mut store = InMemorySessionStore::new();
        store.set_item(USER_KEY, "{not json".to_string()).unwrap();
        let service = AuthService::new(MockAuthApi::builder().build(), store);

        assert!(service.current_user().is_none());
    }

    #[test]
    fn given_empty_access_token_when_checking_authentication_then_is_signed_out() {
        let mut store = InMemorySessionStore::new();
        store.set_item(ACCESS_TOKEN_KEY, String::new()).unwrap();
        let service = AuthService::new(MockAuthApi::builder().build(), store);

        assert!(!service.is_authenticated());
    }

    #[test]
    fn given_failing_storage_when_requiring_session_then_not_authenticated() {
        let service = AuthService::new(MockAuthApi::builder().build(), InMemorySessionStore::failing());

        assert_eq!(stored_access_token(&InMemorySessionStore::failing()), None);
        assert!(matches!(service.require_session(), Err(DomainError::NotAuthenticated)));
    }

    #[test]
    fn given_signed_in_session_when_requiring_session_then_passes() {
        let store = InMemorySessionStore::signed_in(&auth_response_fixture());
        let service = AuthService::new(MockAuthApi::builder().build(), store);

        assert!(service.require_session().is_ok());
    }

    #[test]
    fn given_profile_update_when_updating_then_overwrites_stored_user() {
        // Arrange
        let mut updated = auth_response_fixture().user;
        updated.first_name = Some("Augusta".to_string());
        let mut api = MockAuthApi::builder().with_profile(updated).build();
        let mut store = InMemorySessionStore::signed_in(&auth_response_fixture());
        let mut service = AuthService::new(&mut api, &mut store);
        let update = ProfileUpdate {
            first_name: Some("Augusta".to_string()),
            ..Default::default()
        };

        // Act
        let user = service.update_profile(&update).expect("Update should succeed");

        // Assert
        assert_eq!(user.first_name.as_deref(), Some("Augusta"));
        assert_eq!(
            service.current_user().and_then(|u| u.first_name),
            Some("Augusta".to_string())
        );
    }
}
