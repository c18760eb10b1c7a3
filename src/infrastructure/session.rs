// src/infrastructure/session.rs
use crate::application::SessionStore;
use crate::domain::DomainError;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, warn};

/// Key-value session storage persisted as a flat JSON object.
/// A missing file is an empty store.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// `<data dir>/notesync/session.json`
    pub fn default_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir().context("Could not find data directory")?;
        Ok(data_dir.join("notesync").join("session.json"))
    }

    fn load(&self) -> Result<BTreeMap<String, String>, DomainError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path).map_err(|e| {
            DomainError::Storage(format!("Failed to read {}: {e}", self.path.display()))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            DomainError::Storage(format!("Failed to parse {}: {e}", self.path.display()))
        })
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), DomainError> {
        write_private(&self.path, entries)
            .map_err(|e| DomainError::Storage(format!("{e:#}")))
    }

    fn update<F>(&mut self, apply: F) -> Result<(), DomainError>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let mut entries = self.load()?;
        apply(&mut entries);
        self.save(&entries)
    }
}

/// Tokens are credentials: the file is owner read/write only before any
/// entry is written to it
fn write_private(path: &Path, entries: &BTreeMap<String, String>) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(entries).context("Failed to serialize session")?;

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options
        .open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    // `mode` only applies on creation, an existing file keeps its bits
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))
            .with_context(|| format!("Failed to restrict permissions on {}", path.display()))?;
    }
    file.write_all(json.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

impl SessionStore for FileSessionStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, DomainError> {
        Ok(self.load()?.remove(key))
    }

    #[instrument(level = "debug", skip(self, value))]
    fn set_item(&mut self, key: &str, value: String) -> Result<(), DomainError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value);
        })
    }

    #[instrument(level = "debug", skip_all, fields(count = entries.len()))]
    fn multi_set(&mut self, entries: &[(&str, String)]) -> Result<(), DomainError> {
        self.update(|stored| {
            for (key, value) in entries {
                stored.insert(key.to_string(), value.clone());
            }
        })
    }

    /// An unparseable file is replaced, so signing out always clears it
    #[instrument(level = "debug", skip(self))]
    fn multi_remove(&mut self, keys: &[&str]) -> Result<(), DomainError> {
        let mut stored = self.load().unwrap_or_else(|e| {
            warn!(error = %e, "Discarding unreadable session file");
            BTreeMap::new()
        });
        for key in keys {
            stored.remove(*key);
        }
        self.save(&stored)?;
        debug!(path = %self.path.display(), "Removed session entries");
        Ok(())
    }
}
