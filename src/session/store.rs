use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::SessionStoreError;
use crate::session::{Credential, Session, SessionMode};

pub const TOKEN_KEY: &str = "auth.token";
pub const ORG_KEY: &str = "auth.orgId";

const SESSION_FILE: &str = "session.json";

/// On-disk shape: exactly two durable values under well-known keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    #[serde(rename = "auth.token", default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(rename = "auth.orgId", default, skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl StoredSession {
    fn from_session(session: &Session) -> Self {
        Self {
            token: session.credential.as_ref().map(|c| c.as_stored().to_string()),
            org_id: session.tenant_id.clone(),
            updated_at: Some(Utc::now()),
        }
    }

    fn into_session(self, mode: SessionMode) -> Session {
        Session {
            mode,
            credential: self.token.as_deref().and_then(Credential::from_stored),
            tenant_id: non_blank(self.org_id),
        }
    }

    fn is_cleared(&self) -> bool {
        self.token.is_none() && self.org_id.is_none()
    }
}

/// Durable medium behind the session store.
pub trait SessionBackend: Send + Sync {
    fn load(&self) -> Result<StoredSession, SessionStoreError>;

    fn save(&self, stored: &StoredSession) -> Result<(), SessionStoreError>;

    fn describe(&self) -> String;
}

/// JSON file in the CLI configuration directory.
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `session.json` inside `dir`, or `$HOME/.config/zura` when not given.
    pub fn in_config_dir(dir: Option<&Path>) -> Result<Self, SessionStoreError> {
        let config_dir = match dir {
            Some(dir) => dir.to_path_buf(),
            None => {
                let home = std::env::var("HOME").map_err(|_| {
                    SessionStoreError::NoConfigDir("HOME environment variable not set".into())
                })?;
                PathBuf::from(home).join(".config").join("zura")
            }
        };
        Ok(Self::new(config_dir.join(SESSION_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionBackend for FileBackend {
    fn load(&self) -> Result<StoredSession, SessionStoreError> {
        if !self.path.exists() {
            return Ok(StoredSession::default());
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, stored: &StoredSession) -> Result<(), SessionStoreError> {
        if stored.is_cleared() {
            if self.path.exists() {
                fs::remove_file(&self.path)?;
            }
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(stored)?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Process-local medium for tests and ephemeral clients.
#[derive(Default)]
pub struct MemoryBackend {
    cell: Mutex<StoredSession>,
}

impl MemoryBackend {
    pub fn with(stored: StoredSession) -> Self {
        Self {
            cell: Mutex::new(stored),
        }
    }
}

impl SessionBackend for MemoryBackend {
    fn load(&self) -> Result<StoredSession, SessionStoreError> {
        Ok(self.cell.lock().unwrap_or_else(|p| p.into_inner()).clone())
    }

    fn save(&self, stored: &StoredSession) -> Result<(), SessionStoreError> {
        *self.cell.lock().unwrap_or_else(|p| p.into_inner()) = stored.clone();
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

/// Owner of the current [`Session`].
///
/// Reads are synchronous and always reflect the latest committed write in
/// this process. Every mutation is persisted to the backend and published
/// on a watch channel (the session-status signal).
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    state: watch::Sender<Session>,
    backend: Box<dyn SessionBackend>,
}

impl SessionStore {
    /// Read the persisted session back; an unreadable medium starts empty.
    pub fn open(mode: SessionMode, backend: impl SessionBackend + 'static) -> Self {
        let session = match backend.load() {
            Ok(stored) => stored.into_session(mode),
            Err(e) => {
                tracing::warn!(
                    "Ignoring unreadable session storage {}: {}",
                    backend.describe(),
                    e
                );
                Session::empty(mode)
            }
        };
        tracing::debug!(
            "Session store opened at {} (authenticated: {})",
            backend.describe(),
            session.is_authenticated()
        );
        let (state, _) = watch::channel(session);
        Self {
            inner: Arc::new(StoreInner {
                state,
                backend: Box::new(backend),
            }),
        }
    }

    pub fn in_memory(mode: SessionMode) -> Self {
        Self::open(mode, MemoryBackend::default())
    }

    pub fn mode(&self) -> SessionMode {
        self.inner.state.borrow().mode
    }

    pub fn get(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    /// Replace both values; `None` clears that value.
    pub fn set(
        &self,
        credential: Option<Credential>,
        tenant_id: Option<String>,
    ) -> Result<(), SessionStoreError> {
        let tenant_id = non_blank(tenant_id);
        self.commit(|session| {
            session.credential = credential;
            session.tenant_id = tenant_id;
        })
    }

    pub fn set_tenant(&self, tenant_id: Option<String>) -> Result<(), SessionStoreError> {
        let tenant_id = non_blank(tenant_id);
        self.commit(|session| session.tenant_id = tenant_id)
    }

    pub fn clear(&self) -> Result<(), SessionStoreError> {
        self.commit(|session| {
            session.credential = None;
            session.tenant_id = None;
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }

    pub fn location(&self) -> String {
        self.inner.backend.describe()
    }

    fn commit(&self, mutate: impl FnOnce(&mut Session)) -> Result<(), SessionStoreError> {
        let mut result = Ok(());
        // Persist while holding the channel lock so writes land in commit order
        self.inner.state.send_modify(|session| {
            mutate(session);
            result = self.inner.backend.save(&StoredSession::from_session(session));
        });
        result
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
