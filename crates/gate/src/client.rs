// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Composition root for the authenticated request pipeline.

use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::broadcast;

use crate::auth::refresh::RefreshSettings;
use crate::auth::{ErrorInterceptor, PathRules, RequestInterceptor, TokenRefresher};
use crate::config::ClientConfig;
use crate::credential::{AuthEvent, CredentialStore};
use crate::error::ApiError;
use crate::request::{ApiRequest, ApiResponse};
use crate::transport::Transport;

/// Tokens issued by the login endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginData {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// HTTP client that attaches credentials and transparently renews them.
pub struct ApiClient {
    store: Arc<dyn CredentialStore>,
    transport: Arc<dyn Transport>,
    request: RequestInterceptor,
    recovery: ErrorInterceptor,
    event_tx: broadcast::Sender<AuthEvent>,
    login_path: String,
    login_redirect: String,
}

impl ApiClient {
    pub fn new(
        config: &ClientConfig,
        store: Arc<dyn CredentialStore>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(64);
        let refresher = Arc::new(TokenRefresher::new(
            Arc::clone(&store),
            Arc::clone(&transport),
            RefreshSettings {
                refresh_path: config.refresh_path.clone(),
                tenant_header: config.tenant_header.clone(),
                login_redirect: config.login_redirect.clone(),
            },
            event_tx.clone(),
        ));
        let request = RequestInterceptor::new(
            Arc::clone(&store),
            &config.tenant_header,
            PathRules::new(&config.context_exempt_paths),
        );
        let recovery = ErrorInterceptor::new(refresher, PathRules::new(&config.public_paths));
        Self {
            store,
            transport,
            request,
            recovery,
            event_tx,
            login_path: config.login_path.clone(),
            login_redirect: config.login_redirect.clone(),
        }
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    /// Subscribe to session events (refreshed, refresh failed, logged out, ...).
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.event_tx.subscribe()
    }

    /// Send a request through the full pipeline.
    pub async fn send(&self, mut request: ApiRequest) -> Result<ApiResponse, ApiError> {
        self.request.apply(&mut request);
        match self.transport.send(&request).await {
            Ok(resp) => Ok(resp),
            Err(e) => self.recovery.recover(Some(&request), e).await,
        }
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse, ApiError> {
        self.send(ApiRequest::get(path)).await
    }

    pub async fn post(&self, path: &str, body: serde_json::Value) -> Result<ApiResponse, ApiError> {
        self.send(ApiRequest::post(path, body)).await
    }

    pub async fn put(&self, path: &str, body: serde_json::Value) -> Result<ApiResponse, ApiError> {
        self.send(ApiRequest::put(path, body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse, ApiError> {
        self.send(ApiRequest::delete(path)).await
    }

    /// Exchange a username and password for tokens and store them.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let resp = self
            .send(ApiRequest::post(
                self.login_path.clone(),
                serde_json::json!({ "username": username, "password": password }),
            ))
            .await?;
        let data: LoginData = resp.data_as(&self.login_path)?;
        self.store.sign_in(data.access_token, data.refresh_token);
        let _ = self.event_tx.send(AuthEvent::LoggedIn);
        tracing::info!(username, "signed in");
        Ok(())
    }

    /// Clear the local session.
    pub fn logout(&self) {
        self.store.logout();
        let _ = self.event_tx.send(AuthEvent::LoggedOut { redirect: self.login_redirect.clone() });
    }

    pub fn select_tenant(&self, tenant_id: Option<String>) {
        self.store.select_tenant(tenant_id);
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
