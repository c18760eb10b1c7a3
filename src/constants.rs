// src/constants.rs
//
// Application-wide constants shared by the client, its storage and its output.

/// Session entry holding the bearer token sent with every request.
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Session entry holding the refresh token issued alongside the access token.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Session entry holding the JSON-serialized user record.
pub const USER_KEY: &str = "user";

/// Every session entry, written together on sign-in and removed together on logout.
pub const SESSION_KEYS: [&str; 3] = [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY];

/// Page size requested when fetching the whole notes listing in one call.
///
/// Used in: `infrastructure/http.rs`
pub const ALL_NOTES_PAGE_SIZE: u32 = 1000;

/// Interval of the editor's "Last saved" ticker.
///
/// Used in: `infrastructure/editor.rs`
pub const AUTOSAVE_INTERVAL_SECS: u64 = 30;

/// How often the editor session checks whether the external editor exited.
pub const EDITOR_POLL_INTERVAL_MS: u64 = 250;

/// Characters of note content shown in a list row before truncation.
///
/// Used in: `ports/terminal.rs`
pub const PREVIEW_CHARS: usize = 80;
