// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential store contract and session events.
//!
//! The pipeline only reads a [`Credentials`] snapshot and mutates the store
//! through the operations on [`CredentialStore`]. Persistence is the store's
//! own business; [`persist`] is what the CLI uses.

pub mod persist;
pub mod store;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub use store::MemoryStore;

/// Point-in-time copy of the stored credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub tenant_id: Option<String>,
}

impl Credentials {
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }
}

/// Read/write contract the pipeline requires from the credential store.
///
/// All operations are synchronous; implementations must not block on I/O.
pub trait CredentialStore: Send + Sync {
    fn credentials(&self) -> Credentials;

    /// Atomically replace the access token.
    fn set_access_token(&self, token: String);

    /// Replace the refresh token after the backend rotated it.
    fn set_refresh_token(&self, token: String);

    fn sign_in(&self, access_token: String, refresh_token: Option<String>);

    fn select_tenant(&self, tenant_id: Option<String>);

    /// Clear all credentials and mark the session unauthenticated.
    fn logout(&self);
}

/// Events emitted by the pipeline as the session changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuthEvent {
    LoggedIn,
    /// A refresh produced a new access token.
    Refreshed { access_token: String },
    #[serde(rename = "refresh:failed")]
    RefreshFailed { error: String },
    /// The session was torn down; the application should navigate to `redirect`.
    LoggedOut { redirect: String },
}

/// Resolve the state directory for persisted sessions.
///
/// Checks `CONSOLE_STATE_DIR`, then `$XDG_STATE_HOME/consolegate`,
/// then `$HOME/.local/state/consolegate`.
pub fn state_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CONSOLE_STATE_DIR") {
        return PathBuf::from(dir);
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return PathBuf::from(xdg).join("consolegate");
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".local/state/consolegate");
    }
    PathBuf::from(".consolegate")
}
