/// Client-side session state
///
/// A session is either anonymous or holds a bearer token (and, once known,
/// the signed-in user). The token is persisted through a [`TokenStorage`]
/// so a restarted client comes back signed in.
///
/// ```text
/// Anonymous --login/register--> Authenticated
/// Authenticated --logout--> Anonymous   (even if the server call fails)
/// ```
///
/// No re-validation happens at load time: a stale persisted token is only
/// discovered when the server answers 401.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError, RwLock},
};
use taskboard_shared::resources::{AuthResponse, UserResource};

use crate::error::StorageError;

/// Where the session token survives between runs
pub trait TokenStorage: Send + Sync {
    fn load(&self) -> Result<Option<String>, StorageError>;
    fn save(&self, token: &str) -> Result<(), StorageError>;
    fn clear(&self) -> Result<(), StorageError>;
}

/// Process-local storage, lost on exit
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.token.lock().map_err(|_| StorageError::Poisoned)?.clone())
    }

    fn save(&self, token: &str) -> Result<(), StorageError> {
        *self.token.lock().map_err(|_| StorageError::Poisoned)? = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.token.lock().map_err(|_| StorageError::Poisoned)? = None;
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenFile {
    token: String,
    saved_at: DateTime<Utc>,
}

/// JSON file storage, e.g. `~/.config/taskboard/session.json`
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        let file: TokenFile = serde_json::from_str(&content)?;
        Ok(Some(file.token))
    }

    fn save(&self, token: &str) -> Result<(), StorageError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }

        let content = serde_json::to_string_pretty(&TokenFile {
            token: token.to_string(),
            saved_at: Utc::now(),
        })?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Anonymous,
    Authenticated {
        token: String,
        user: Option<UserResource>,
    },
}

/// Session shared by the API client and the router guard
pub struct SessionStore {
    state: RwLock<SessionState>,
    storage: Box<dyn TokenStorage>,
}

impl SessionStore {
    /// Restores the persisted token, if any
    pub fn load(storage: impl TokenStorage + 'static) -> Result<Self, StorageError> {
        let state = match storage.load()? {
            Some(token) => SessionState::Authenticated { token, user: None },
            None => SessionState::Anonymous,
        };

        tracing::debug!(
            authenticated = matches!(state, SessionState::Authenticated { .. }),
            "Session loaded"
        );

        Ok(Self {
            state: RwLock::new(state),
            storage: Box::new(storage),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            state: RwLock::new(SessionState::Anonymous),
            storage: Box::new(MemoryTokenStorage::new()),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn token(&self) -> Option<String> {
        match &*self.state.read().unwrap_or_else(PoisonError::into_inner) {
            SessionState::Authenticated { token, .. } => Some(token.clone()),
            SessionState::Anonymous => None,
        }
    }

    pub fn user(&self) -> Option<UserResource> {
        match &*self.state.read().unwrap_or_else(PoisonError::into_inner) {
            SessionState::Authenticated { user, .. } => user.clone(),
            SessionState::Anonymous => None,
        }
    }

    /// Presence check only; the token may still be rejected by the server
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Persists the token from a login or register response
    pub fn establish(&self, auth: AuthResponse) -> Result<(), StorageError> {
        self.storage.save(&auth.token)?;

        let mut state = self.state.write().map_err(|_| StorageError::Poisoned)?;
        *state = SessionState::Authenticated {
            token: auth.token,
            user: Some(auth.user),
        };

        Ok(())
    }

    /// Drops the in-memory session first so a storage failure cannot leave it signed in
    pub fn clear(&self) -> Result<(), StorageError> {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = SessionState::Anonymous;
        self.storage.clear()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}
