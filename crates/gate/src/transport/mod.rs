// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Network seam between the pipeline and the backend.

pub mod http;

use futures_util::future::BoxFuture;

use crate::error::ApiError;
use crate::request::{ApiRequest, ApiResponse};

pub use http::HttpTransport;

/// Sends one request and reports non-success statuses as [`ApiError::Status`].
///
/// Implementations apply their own timeout policy; a timeout surfaces as
/// [`ApiError::Transport`].
pub trait Transport: Send + Sync {
    fn send<'a>(&'a self, request: &'a ApiRequest) -> BoxFuture<'a, Result<ApiResponse, ApiError>>;
}
