//! Durable token persistence.
//!
//! # Design
//! Exactly two strings survive restarts: the access and refresh tokens.
//! The trait API is infallible — storage faults are logged and swallowed,
//! the same contract browser local storage gives a web client. A broken
//! token file degrades to "not logged in", never to an error the caller
//! has to handle.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// The persisted session credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// Where the session keeps its tokens between runs.
pub trait TokenStorage: Send + Sync {
    fn load(&self) -> Option<StoredTokens>;
    fn store(&self, tokens: &StoredTokens);
    /// Replace only the access token, keeping the stored refresh token.
    fn update_access(&self, access_token: &str);
    fn clear(&self);
}

/// In-memory storage, for tests and embedders that manage persistence
/// themselves.
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    inner: Mutex<Option<StoredTokens>>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> Option<StoredTokens> {
        self.inner.lock().unwrap().clone()
    }

    fn store(&self, tokens: &StoredTokens) {
        *self.inner.lock().unwrap() = Some(tokens.clone());
    }

    fn update_access(&self, access_token: &str) {
        if let Some(stored) = self.inner.lock().unwrap().as_mut() {
            stored.access_token = access_token.to_string();
        }
    }

    fn clear(&self) {
        *self.inner.lock().unwrap() = None;
    }
}

/// JSON file under the user configuration directory.
#[derive(Debug)]
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    /// Storage at `<config_dir>/imobiliaria/tokens.json`.
    pub fn new() -> io::Result<Self> {
        let base = dirs::config_dir()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no config directory"))?;
        Ok(Self::at_path(base.join("imobiliaria").join("tokens.json")))
    }

    pub fn at_path(path: PathBuf) -> Self {
        Self { path }
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> Option<StoredTokens> {
        let raw = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(tokens) => Some(tokens),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "discarding unreadable token file");
                None
            }
        }
    }

    fn store(&self, tokens: &StoredTokens) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                warn!(path = %parent.display(), error = %e, "could not create token directory");
                return;
            }
        }
        let raw = match serde_json::to_string_pretty(tokens) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "could not serialize tokens");
                return;
            }
        };
        if let Err(e) = fs::write(&self.path, raw) {
            warn!(path = %self.path.display(), error = %e, "could not persist tokens");
        }
    }

    fn update_access(&self, access_token: &str) {
        match self.load() {
            Some(mut stored) => {
                stored.access_token = access_token.to_string();
                self.store(&stored);
            }
            None => warn!("access token updated with no stored session"),
        }
    }

    fn clear(&self) {
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), error = %e, "could not clear tokens");
            }
        }
    }
}
