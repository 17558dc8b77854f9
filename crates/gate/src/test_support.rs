// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake transport and counting store shared by unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use parking_lot::Mutex;

use crate::client::ApiClient;
use crate::config::{ClientConfig, DEFAULT_TENANT_HEADER};
use crate::credential::{CredentialStore, Credentials, MemoryStore};
use crate::error::ApiError;
use crate::request::{ApiRequest, ApiResponse};
use crate::transport::Transport;

/// How the fake answers `POST /auth/refresh`.
#[derive(Debug, Clone)]
pub enum RefreshReply {
    Token(&'static str),
    /// New access token plus a rotated refresh token.
    Rotating(&'static str, &'static str),
    Status(u16),
    Unreachable,
    NoToken,
}

/// One request observed by the fake.
#[derive(Debug, Clone)]
pub struct Seen {
    pub path: String,
    pub bearer: Option<String>,
    pub tenant: Option<String>,
    pub body: Option<serde_json::Value>,
}

/// In-process backend: accepts one access token, answers refresh and login.
pub struct FakeBackend {
    accepted: &'static str,
    reply: RefreshReply,
    refresh_delay: Duration,
    broken_paths: Vec<&'static str>,
    refresh_calls: AtomicUsize,
    seen: Mutex<Vec<Seen>>,
}

impl FakeBackend {
    pub fn new(accepted: &'static str, reply: RefreshReply) -> Self {
        Self {
            accepted,
            reply,
            refresh_delay: Duration::from_millis(20),
            broken_paths: Vec::new(),
            refresh_calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Paths that answer 500 even with a valid token.
    pub fn broken(mut self, paths: &[&'static str]) -> Self {
        self.broken_paths.extend_from_slice(paths);
        self
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.seen.lock().clone()
    }

    /// Bearer tokens carried by requests to `path`, in arrival order.
    pub fn bearers_for(&self, path: &str) -> Vec<Option<String>> {
        self.seen().into_iter().filter(|s| s.path == path).map(|s| s.bearer).collect()
    }

    fn status(request: &ApiRequest, status: u16) -> ApiError {
        ApiError::Status {
            method: request.method.to_string(),
            path: request.path.clone(),
            status,
            body: format!("{{\"code\":{status}}}"),
        }
    }

    async fn handle(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let bearer = request.bearer().map(str::to_owned);
        self.seen.lock().push(Seen {
            path: request.path.clone(),
            bearer: bearer.clone(),
            tenant: request
                .headers
                .get(DEFAULT_TENANT_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned),
            body: request.body.clone(),
        });

        match request.path.as_str() {
            "/auth/refresh" => {
                self.refresh_calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(self.refresh_delay).await;
                match self.reply {
                    RefreshReply::Token(token) => Ok(ApiResponse {
                        status: 200,
                        body: serde_json::json!({ "code": 0, "data": { "accessToken": token } }),
                    }),
                    RefreshReply::Rotating(token, refresh) => Ok(ApiResponse {
                        status: 200,
                        body: serde_json::json!({
                            "code": 0,
                            "data": { "accessToken": token, "refreshToken": refresh }
                        }),
                    }),
                    RefreshReply::Status(status) => Err(Self::status(request, status)),
                    RefreshReply::Unreachable => Err(ApiError::Transport {
                        path: request.path.clone(),
                        message: "connection refused".into(),
                    }),
                    RefreshReply::NoToken => Ok(ApiResponse {
                        status: 200,
                        body: serde_json::json!({ "code": 0, "data": {} }),
                    }),
                }
            }
            "/auth/login" => {
                let password = request.body.as_ref().and_then(|b| b["password"].as_str());
                if password == Some("secret") {
                    Ok(ApiResponse {
                        status: 200,
                        body: serde_json::json!({
                            "code": 0,
                            "data": { "accessToken": self.accepted, "refreshToken": "R1" }
                        }),
                    })
                } else {
                    Err(Self::status(request, 401))
                }
            }
            path => {
                if bearer.as_deref() != Some(self.accepted) {
                    return Err(Self::status(request, 401));
                }
                if self.broken_paths.iter().any(|p| *p == path) {
                    return Err(Self::status(request, 500));
                }
                Ok(ApiResponse {
                    status: 200,
                    body: serde_json::json!({ "code": 0, "data": { "path": path } }),
                })
            }
        }
    }
}

impl Transport for FakeBackend {
    fn send<'a>(&'a self, request: &'a ApiRequest) -> BoxFuture<'a, Result<ApiResponse, ApiError>> {
        self.handle(request).boxed()
    }
}

/// Memory store that counts logouts.
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryStore,
    logouts: AtomicUsize,
}

impl CountingStore {
    pub fn signed_in(access: &str, refresh: Option<&str>) -> Self {
        let store = Self::default();
        store.inner.sign_in(access.to_owned(), refresh.map(str::to_owned));
        store
    }

    pub fn logouts(&self) -> usize {
        self.logouts.load(Ordering::SeqCst)
    }
}

impl CredentialStore for CountingStore {
    fn credentials(&self) -> Credentials {
        self.inner.credentials()
    }

    fn set_access_token(&self, token: String) {
        self.inner.set_access_token(token);
    }

    fn set_refresh_token(&self, token: String) {
        self.inner.set_refresh_token(token);
    }

    fn sign_in(&self, access_token: String, refresh_token: Option<String>) {
        self.inner.sign_in(access_token, refresh_token);
    }

    fn select_tenant(&self, tenant_id: Option<String>) {
        self.inner.select_tenant(tenant_id);
    }

    fn logout(&self) {
        self.logouts.fetch_add(1, Ordering::SeqCst);
        self.inner.logout();
    }
}

/// Client wired to `backend` and `store` with default settings.
pub fn client(backend: &Arc<FakeBackend>, store: &Arc<CountingStore>) -> ApiClient {
    ApiClient::new(
        &ClientConfig::default(),
        Arc::clone(store) as Arc<dyn CredentialStore>,
        Arc::clone(backend) as Arc<dyn Transport>,
    )
}
