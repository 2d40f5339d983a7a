//! Client-side session and role state.
//!
//! The session is a single `{token, role, address, email}` tuple. It is
//! replaced wholesale on login, cleared on logout and persisted as JSON so it
//! survives restarts of the client. Nothing on the server consults it; route
//! guards in [`guard`] are its only consumers.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod guard;

pub use guard::{guard, GuardOutcome, Route};

/// Actor roles known to the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Guest,
    Admin,
    Issuer,
    Student,
    Verifier,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Guest,
        Role::Admin,
        Role::Issuer,
        Role::Student,
        Role::Verifier,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Guest => "guest",
            Role::Admin => "admin",
            Role::Issuer => "issuer",
            Role::Student => "student",
            Role::Verifier => "verifier",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lc = s.trim().to_ascii_lowercase();
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == lc)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// The authenticated actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub role: Role,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Session holder, optionally backed by a JSON file.
#[derive(Debug, Default)]
pub struct SessionStore {
    path: Option<PathBuf>,
    current: Option<Session>,
}

impl SessionStore {
    /// A store that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Opens the store persisted at `path`, hydrating any saved session.
    ///
    /// A missing file means "signed out". A file that cannot be parsed is
    /// treated the same way and overwritten on the next login.
    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let current = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<Session>(&raw) {
                Ok(session) => Some(session),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "discarding unreadable session file");
                    None
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                return Err(e).with_context(|| format!("reading session file {}", path.display()))
            }
        };
        Ok(Self {
            path: Some(path),
            current,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    /// Role of the current actor; `guest` when signed out.
    pub fn role(&self) -> Role {
        self.current.as_ref().map(|s| s.role).unwrap_or(Role::Guest)
    }

    pub fn token(&self) -> Option<&str> {
        self.current.as_ref().map(|s| s.token.as_str())
    }

    /// Replaces the whole session tuple.
    pub fn login(&mut self, session: Session) -> anyhow::Result<()> {
        if let Some(path) = &self.path {
            let raw = serde_json::to_string_pretty(&session)?;
            std::fs::write(path, raw)
                .with_context(|| format!("writing session file {}", path.display()))?;
        }
        tracing::debug!(role = %session.role, "session stored");
        self.current = Some(session);
        Ok(())
    }

    pub fn logout(&mut self) -> anyhow::Result<()> {
        self.current = None;
        if let Some(path) = &self.path {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("removing session file {}", path.display()))
                }
            }
        }
        Ok(())
    }
}
