// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-flight token refresh with request replay.
//!
//! The first request to hit a 401 while no refresh is running becomes the
//! initiator and performs the one refresh call. Requests that fail while it is
//! in flight register a one-shot waiter and are replayed with the token the
//! initiator obtained. A failed refresh tears the session down and every
//! waiter resolves to its own original error.

use std::sync::Arc;

use parking_lot::Mutex;
use reqwest::header::{HeaderName, HeaderValue};
use tokio::sync::{broadcast, oneshot};

use crate::credential::{AuthEvent, CredentialStore};
use crate::error::{ApiError, RefreshError};
use crate::request::{ApiRequest, ApiResponse};
use crate::transport::Transport;

/// Endpoint and header settings used by the refresher.
#[derive(Debug, Clone)]
pub struct RefreshSettings {
    pub refresh_path: String,
    pub tenant_header: String,
    /// Announced in [`AuthEvent::LoggedOut`] when the session is torn down.
    pub login_redirect: String,
}

/// What a replayed request resolved to.
///
/// Waiters never fail: a waiter whose refresh failed, or whose replay failed,
/// resolves to `Degraded` carrying its original error.
#[derive(Debug)]
pub enum Replayed {
    Succeeded(ApiResponse),
    Degraded(ApiError),
}

/// Verdict delivered to every waiter of a session, exactly once.
#[derive(Debug, Clone)]
enum Settlement {
    Refreshed(String),
    Failed,
    Abandoned,
}

impl Settlement {
    fn label(&self) -> &'static str {
        match self {
            Self::Refreshed(_) => "refreshed",
            Self::Failed => "failed",
            Self::Abandoned => "abandoned",
        }
    }
}

enum Session {
    Idle,
    Refreshing { waiters: Vec<oneshot::Sender<Settlement>> },
}

enum Role {
    Initiator,
    Waiter(oneshot::Receiver<Settlement>),
}

pub struct TokenRefresher {
    store: Arc<dyn CredentialStore>,
    transport: Arc<dyn Transport>,
    settings: RefreshSettings,
    session: Mutex<Session>,
    event_tx: broadcast::Sender<AuthEvent>,
}

impl TokenRefresher {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        transport: Arc<dyn Transport>,
        settings: RefreshSettings,
        event_tx: broadcast::Sender<AuthEvent>,
    ) -> Self {
        Self { store, transport, settings, session: Mutex::new(Session::Idle), event_tx }
    }

    pub fn refresh_path(&self) -> &str {
        &self.settings.refresh_path
    }

    /// Whether a refresh is currently in flight.
    pub fn is_refreshing(&self) -> bool {
        matches!(*self.session.lock(), Session::Refreshing { .. })
    }

    /// Renew the access token (or wait for the in-flight renewal) and replay `request`.
    ///
    /// The initiator returns `Err` when the refresh fails or its own replay
    /// fails; waiters always return `Ok`, degrading to `original` on failure.
    pub async fn refresh_and_retry(
        &self,
        request: &ApiRequest,
        original: &ApiError,
    ) -> Result<Replayed, RefreshError> {
        match self.join() {
            Role::Initiator => self.initiate(request).await,
            Role::Waiter(rx) => Ok(self.wait(rx, request, original).await),
        }
    }

    /// Check-and-set of the session state. No suspension point while locked.
    fn join(&self) -> Role {
        let mut session = self.session.lock();
        match &mut *session {
            Session::Idle => {
                *session = Session::Refreshing { waiters: Vec::new() };
                Role::Initiator
            }
            Session::Refreshing { waiters } => {
                let (tx, rx) = oneshot::channel();
                waiters.push(tx);
                Role::Waiter(rx)
            }
        }
    }

    /// Reset to idle and wake every waiter of the session being closed.
    fn settle(&self, outcome: Settlement) {
        let waiters = match std::mem::replace(&mut *self.session.lock(), Session::Idle) {
            Session::Refreshing { waiters } => waiters,
            Session::Idle => Vec::new(),
        };
        tracing::debug!(waiters = waiters.len(), outcome = outcome.label(), "refresh session settled");
        for waiter in waiters {
            let _ = waiter.send(outcome.clone());
        }
    }

    async fn initiate(&self, request: &ApiRequest) -> Result<Replayed, RefreshError> {
        let mut guard = SettleGuard { refresher: self, armed: true };

        match self.request_token().await {
            Ok(token) => {
                self.store.set_access_token(token.clone());
                let _ = self.event_tx.send(AuthEvent::Refreshed { access_token: token.clone() });
                guard.settle(Settlement::Refreshed(token.clone()));
                tracing::info!(path = %request.path, "access token refreshed");

                match self.replay(request, &token).await {
                    Ok(resp) => Ok(Replayed::Succeeded(resp)),
                    Err(e) => {
                        tracing::debug!(path = %request.path, err = %e, "replay after refresh failed");
                        Err(RefreshError::Replay(e))
                    }
                }
            }
            Err(e) => {
                let _ = self.event_tx.send(AuthEvent::RefreshFailed { error: e.to_string() });
                // Credentials must be gone before the session reopens, or a
                // late 401 would retry the dead refresh token.
                let ended = self.end_session(&e);
                guard.settle(Settlement::Failed);
                if ended {
                    let _ = self
                        .event_tx
                        .send(AuthEvent::LoggedOut { redirect: self.settings.login_redirect.clone() });
                }
                Err(e)
            }
        }
    }

    async fn wait(
        &self,
        rx: oneshot::Receiver<Settlement>,
        request: &ApiRequest,
        original: &ApiError,
    ) -> Replayed {
        match rx.await {
            Ok(Settlement::Refreshed(token)) => match self.replay(request, &token).await {
                Ok(resp) => Replayed::Succeeded(resp),
                Err(e) => {
                    tracing::debug!(path = %request.path, err = %e, "waiter replay failed");
                    Replayed::Degraded(original.clone())
                }
            },
            Ok(Settlement::Failed) | Ok(Settlement::Abandoned) | Err(_) => {
                Replayed::Degraded(original.clone())
            }
        }
    }

    /// Call the refresh endpoint with the stored refresh token.
    async fn request_token(&self) -> Result<String, RefreshError> {
        let creds = self.store.credentials();
        let refresh_token = creds.refresh_token.ok_or(RefreshError::MissingRefreshToken)?;

        let mut req = ApiRequest::post(
            self.settings.refresh_path.clone(),
            serde_json::json!({ "refreshToken": refresh_token }),
        );
        if let Some(ref tenant) = creds.tenant_id {
            if let (Ok(name), Ok(value)) = (
                HeaderName::try_from(self.settings.tenant_header.as_str()),
                HeaderValue::from_str(tenant),
            ) {
                req.headers.insert(name, value);
            }
        }

        let resp = self.transport.send(&req).await.map_err(|e| match e {
            ApiError::Status { status, .. } => RefreshError::Rejected { status },
            other => RefreshError::Transport(other.to_string()),
        })?;

        let data = resp.data();
        if let Some(rotated) = data["refreshToken"].as_str() {
            self.store.set_refresh_token(rotated.to_owned());
        }
        data["accessToken"]
            .as_str()
            .filter(|t| !t.is_empty())
            .map(str::to_owned)
            .ok_or(RefreshError::MissingAccessToken)
    }

    /// Resend `request` carrying `token`.
    async fn replay(&self, request: &ApiRequest, token: &str) -> Result<ApiResponse, ApiError> {
        let mut retry = request.clone();
        if !retry.set_bearer(token) {
            return Err(ApiError::Transport {
                path: request.path.clone(),
                message: "refreshed token is not a valid header value".to_owned(),
            });
        }
        self.transport.send(&retry).await
    }

    /// Clear credentials unless an earlier teardown already did.
    fn end_session(&self, cause: &RefreshError) -> bool {
        let creds = self.store.credentials();
        if creds.access_token.is_none() && creds.refresh_token.is_none() {
            tracing::debug!(err = %cause, "token refresh failed, session already ended");
            return false;
        }
        tracing::warn!(err = %cause, "token refresh failed, ending session");
        self.store.logout();
        true
    }
}

/// Settles the session as abandoned if the initiator is dropped mid-refresh.
struct SettleGuard<'a> {
    refresher: &'a TokenRefresher,
    armed: bool,
}

impl SettleGuard<'_> {
    fn settle(&mut self, outcome: Settlement) {
        self.armed = false;
        self.refresher.settle(outcome);
    }
}

impl Drop for SettleGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            tracing::debug!("refresh initiator dropped before settling");
            self.refresher.settle(Settlement::Abandoned);
        }
    }
}

#[cfg(test)]
#[path = "refresh_tests.rs"]
mod tests;
