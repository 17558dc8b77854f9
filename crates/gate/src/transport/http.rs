// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `reqwest` transport for one backend base URL.

use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use reqwest::Client;

use crate::error::ApiError;
use crate::request::{ApiRequest, ApiResponse};
use crate::transport::Transport;

/// HTTP transport bound to a backend base URL.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: String,
    client: Client,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let _ = rustls::crypto::ring::default_provider().install_default();
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: &str, client: Client) -> Self {
        Self { base_url: base_url.trim_end_matches('/').to_owned(), client }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = self.url(&request.path);
        tracing::debug!(method = %request.method, url = %url, "sending request");

        let mut builder =
            self.client.request(request.method.clone(), &url).headers(request.headers.clone());
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        let resp = builder.send().await.map_err(|e| ApiError::Transport {
            path: request.path.clone(),
            message: e.to_string(),
        })?;

        let status = resp.status();
        let bytes = resp.bytes().await.map_err(|e| ApiError::Transport {
            path: request.path.clone(),
            message: e.to_string(),
        })?;

        if !status.is_success() {
            return Err(ApiError::Status {
                method: request.method.to_string(),
                path: request.path.clone(),
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode {
                path: request.path.clone(),
                message: e.to_string(),
            })?
        };
        Ok(ApiResponse { status: status.as_u16(), body })
    }
}

impl Transport for HttpTransport {
    fn send<'a>(&'a self, request: &'a ApiRequest) -> BoxFuture<'a, Result<ApiResponse, ApiError>> {
        self.execute(request).boxed()
    }
}
