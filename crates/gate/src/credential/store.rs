// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory credential store.

use parking_lot::RwLock;

use crate::credential::persist::PersistedSession;
use crate::credential::{CredentialStore, Credentials};

/// Credential store backed by a lock-protected snapshot.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Credentials>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credentials(credentials: Credentials) -> Self {
        Self { inner: RwLock::new(credentials) }
    }

    /// Seed the store from a persisted session.
    pub fn from_persisted(session: PersistedSession) -> Self {
        Self::with_credentials(Credentials {
            access_token: session.access_token,
            refresh_token: session.refresh_token,
            tenant_id: session.tenant_id,
        })
    }

    /// Snapshot suitable for writing back to disk.
    pub fn to_persisted(&self) -> PersistedSession {
        let creds = self.inner.read();
        PersistedSession {
            access_token: creds.access_token.clone(),
            refresh_token: creds.refresh_token.clone(),
            tenant_id: creds.tenant_id.clone(),
        }
    }
}

impl CredentialStore for MemoryStore {
    fn credentials(&self) -> Credentials {
        self.inner.read().clone()
    }

    fn set_access_token(&self, token: String) {
        self.inner.write().access_token = Some(token);
    }

    fn set_refresh_token(&self, token: String) {
        self.inner.write().refresh_token = Some(token);
    }

    fn sign_in(&self, access_token: String, refresh_token: Option<String>) {
        let mut creds = self.inner.write();
        creds.access_token = Some(access_token);
        creds.refresh_token = refresh_token;
    }

    fn select_tenant(&self, tenant_id: Option<String>) {
        self.inner.write().tenant_id = tenant_id;
    }

    fn logout(&self) {
        *self.inner.write() = Credentials::default();
    }
}
