use crate::models::Session;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

/// Errors that can occur with session persistence
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode stored session: {0}")]
    Decode(#[from] toml::de::Error),

    #[error("Failed to encode session: {0}")]
    Encode(#[from] toml::ser::Error),
}

/// Durable home of the session token and user snapshot
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<Session>, StoreError>;

    fn save(&self, session: &Session) -> Result<(), StoreError>;

    fn clear(&self) -> Result<(), StoreError>;
}

/// TOML file store
///
/// Keys are fixed: `access_token`, `refresh_token` and a `[user]` table.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data dir>/lume/session.toml`, or `./session.toml` if the platform has none
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .map(|dir| dir.join("lume").join("session.toml"))
            .unwrap_or_else(|| PathBuf::from("session.toml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>, StoreError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let session: Session = toml::from_str(&raw)?;
        tracing::trace!("Loaded session from {}", self.path.display());
        Ok(Some(session))
    }

    fn save(&self, session: &Session) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let raw = toml::to_string(session)?;
        std::fs::write(&self.path, raw)?;
        tracing::trace!("Saved session to {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Process-local store, used by tests and throwaway sessions
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            session: Mutex::new(Some(session)),
        }
    }

    /// Current contents, for assertions
    pub fn snapshot(&self) -> Option<Session> {
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>, StoreError> {
        Ok(self.snapshot())
    }

    fn save(&self, session: &Session) -> Result<(), StoreError> {
        *self.session.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.session.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
        Ok(())
    }
}

impl<S: SessionStore + ?Sized> SessionStore for std::sync::Arc<S> {
    fn load(&self) -> Result<Option<Session>, StoreError> {
        (**self).load()
    }

    fn save(&self, session: &Session) -> Result<(), StoreError> {
        (**self).save(session)
    }

    fn clear(&self) -> Result<(), StoreError> {
        (**self).clear()
    }
}
