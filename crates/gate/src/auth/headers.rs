// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outgoing request interceptor: attaches the bearer token and tenant scope.

use std::sync::Arc;

use reqwest::header::{HeaderName, HeaderValue};

use crate::auth::PathRules;
use crate::credential::CredentialStore;
use crate::request::ApiRequest;

pub struct RequestInterceptor {
    store: Arc<dyn CredentialStore>,
    tenant_header: Option<HeaderName>,
    context_exempt: PathRules,
}

impl RequestInterceptor {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        tenant_header: &str,
        context_exempt: PathRules,
    ) -> Self {
        let tenant_header = match HeaderName::try_from(tenant_header) {
            Ok(name) => Some(name),
            Err(e) => {
                tracing::warn!(header = tenant_header, err = %e, "invalid tenant header name, tenant scope disabled");
                None
            }
        };
        Self { store, tenant_header, context_exempt }
    }

    /// Attach credentials to `request`. Never fails; unencodable values are skipped.
    pub fn apply(&self, request: &mut ApiRequest) {
        let creds = self.store.credentials();

        if let Some(ref token) = creds.access_token {
            if !request.set_bearer(token) {
                tracing::warn!(path = %request.path, "access token is not a valid header value");
            }
        }

        if self.context_exempt.matches(&request.path) {
            return;
        }
        let (Some(name), Some(tenant)) = (&self.tenant_header, creds.tenant_id) else {
            return;
        };
        if request.headers.contains_key(name) {
            return;
        }
        match HeaderValue::from_str(&tenant) {
            Ok(value) => {
                request.headers.insert(name.clone(), value);
            }
            Err(_) => tracing::warn!(path = %request.path, "tenant id is not a valid header value"),
        }
    }
}

#[cfg(test)]
#[path = "headers_tests.rs"]
mod tests;
