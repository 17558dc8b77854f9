// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error interceptor: decides whether a failed request gets a refresh-and-retry.

use std::sync::Arc;

use crate::auth::refresh::{Replayed, TokenRefresher};
use crate::auth::PathRules;
use crate::error::{ApiError, RefreshError};
use crate::request::{ApiRequest, ApiResponse};

pub struct ErrorInterceptor {
    refresher: Arc<TokenRefresher>,
    public: PathRules,
    refresh_endpoint: PathRules,
}

impl ErrorInterceptor {
    pub fn new(refresher: Arc<TokenRefresher>, public: PathRules) -> Self {
        let refresh_endpoint = PathRules::new([refresher.refresh_path()]);
        Self { refresher, public, refresh_endpoint }
    }

    /// Whether a 401 from `path` must be propagated without refreshing.
    pub fn is_exempt(&self, path: &str) -> bool {
        self.public.matches(path) || self.refresh_endpoint.matches(path)
    }

    /// Recover from `error` if it is a refresh-eligible 401, else return it unchanged.
    pub async fn recover(
        &self,
        request: Option<&ApiRequest>,
        error: ApiError,
    ) -> Result<ApiResponse, ApiError> {
        if !error.is_unauthorized() {
            return Err(error);
        }
        let Some(request) = request else {
            return Err(error);
        };
        if self.is_exempt(&request.path) {
            tracing::debug!(path = %request.path, "401 on exempt endpoint, not refreshing");
            return Err(error);
        }

        match self.refresher.refresh_and_retry(request, &error).await {
            Ok(Replayed::Succeeded(resp)) => Ok(resp),
            Ok(Replayed::Degraded(original)) => Err(original),
            Err(RefreshError::Replay(e)) => Err(e),
            Err(e) => {
                tracing::debug!(path = %request.path, err = %e, "refresh did not recover request");
                Err(error)
            }
        }
    }
}
