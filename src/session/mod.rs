//! Process-wide authentication state.
//!
//! A [`Session`] is owned by exactly one [`SessionStore`]; everything else
//! (the request pipeline, the auth facade, the unauthorized handler and the
//! hydration controller) receives the store by injection.

pub mod events;
pub mod store;

use serde::{Deserialize, Serialize};

pub use events::{SessionEvent, SessionEvents};
pub use store::{FileBackend, MemoryBackend, SessionBackend, SessionStore, StoredSession};

/// Placeholder credential meaning "authenticated by a server cookie".
pub const COOKIE_SESSION_SENTINEL: &str = "session";

/// Whether authentication relies on a server-managed cookie or a client-held
/// bearer credential. Fixed at configuration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    Cookie,
    Token,
}

impl SessionMode {
    /// Cookie mode unless the flag is literally `false`.
    pub fn from_use_cookies(flag: &str) -> Self {
        if flag.trim().eq_ignore_ascii_case("false") {
            SessionMode::Token
        } else {
            SessionMode::Cookie
        }
    }

    pub fn uses_cookies(&self) -> bool {
        matches!(self, SessionMode::Cookie)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    Bearer(String),
    CookieSession,
}

impl Credential {
    /// Parse the persisted form; blank values read as absent.
    pub fn from_stored(value: &str) -> Option<Self> {
        match value.trim() {
            "" => None,
            COOKIE_SESSION_SENTINEL => Some(Credential::CookieSession),
            token => Some(Credential::Bearer(token.to_string())),
        }
    }

    pub fn as_stored(&self) -> &str {
        match self {
            Credential::Bearer(token) => token,
            Credential::CookieSession => COOKIE_SESSION_SENTINEL,
        }
    }

    /// Token to send as `Authorization: Bearer`, if this credential has one.
    pub fn bearer(&self) -> Option<&str> {
        match self {
            Credential::Bearer(token) => Some(token),
            Credential::CookieSession => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub mode: SessionMode,
    pub credential: Option<Credential>,
    pub tenant_id: Option<String>,
}

impl Session {
    pub fn empty(mode: SessionMode) -> Self {
        Self {
            mode,
            credential: None,
            tenant_id: None,
        }
    }

    /// A credential is necessary and sufficient for "authenticated".
    pub fn is_authenticated(&self) -> bool {
        self.credential.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.credential.is_none() && self.tenant_id.is_none()
    }
}
