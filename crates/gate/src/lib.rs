// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Consolegate: authenticated request pipeline for the admin console backend.
//!
//! Outgoing requests get the bearer token and tenant scope attached; a 401
//! on a protected endpoint triggers one shared token refresh, after which
//! every request that failed in the meantime is replayed with the new token.

pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod credential;
pub mod error;
pub mod request;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use client::ApiClient;
pub use config::ClientConfig;
pub use credential::{AuthEvent, CredentialStore, Credentials, MemoryStore};
pub use error::{ApiError, RefreshError};
pub use request::{ApiRequest, ApiResponse};
pub use transport::{HttpTransport, Transport};
