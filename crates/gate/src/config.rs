// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_TENANT_HEADER: &str = "X-Tenant-Id";
pub const DEFAULT_REFRESH_PATH: &str = "/auth/refresh";
pub const DEFAULT_LOGIN_PATH: &str = "/auth/login";
pub const DEFAULT_LOGIN_REDIRECT: &str = "/login";
/// Endpoints that never trigger a refresh on 401.
pub const DEFAULT_PUBLIC_PATHS: [&str; 4] =
    ["/auth/login", "/auth/register", "/auth/refresh", "/init/*"];
/// Endpoints that precede credential issuance and never carry the tenant header.
pub const DEFAULT_CONTEXT_EXEMPT_PATHS: [&str; 2] = ["/auth/login", "/auth/register"];

/// Configuration for the authenticated request pipeline.
#[derive(Debug, Clone, clap::Args)]
pub struct ClientConfig {
    /// Backend base URL.
    #[arg(long, default_value = DEFAULT_BASE_URL, env = "CONSOLE_BASE_URL")]
    pub base_url: String,

    /// Per-request timeout in milliseconds.
    #[arg(long, default_value_t = 30000, env = "CONSOLE_TIMEOUT_MS")]
    pub timeout_ms: u64,

    /// Header carrying the selected tenant/project scope.
    #[arg(long, default_value = DEFAULT_TENANT_HEADER, env = "CONSOLE_TENANT_HEADER")]
    pub tenant_header: String,

    /// Token refresh endpoint.
    #[arg(long, default_value = DEFAULT_REFRESH_PATH, env = "CONSOLE_REFRESH_PATH")]
    pub refresh_path: String,

    /// Login endpoint.
    #[arg(long, default_value = DEFAULT_LOGIN_PATH, env = "CONSOLE_LOGIN_PATH")]
    pub login_path: String,

    /// Endpoints exempt from refresh-on-401 (`/prefix/*` matches a subtree).
    #[arg(
        long,
        value_delimiter = ',',
        default_values = DEFAULT_PUBLIC_PATHS,
        env = "CONSOLE_PUBLIC_PATHS"
    )]
    pub public_paths: Vec<String>,

    /// Endpoints that never carry the tenant header.
    #[arg(
        long,
        value_delimiter = ',',
        default_values = DEFAULT_CONTEXT_EXEMPT_PATHS,
        env = "CONSOLE_CONTEXT_EXEMPT_PATHS"
    )]
    pub context_exempt_paths: Vec<String>,

    /// Login entry point announced when the session is torn down.
    #[arg(long, default_value = DEFAULT_LOGIN_REDIRECT, env = "CONSOLE_LOGIN_REDIRECT")]
    pub login_redirect: String,

    /// Directory holding the persisted session.
    #[arg(long, env = "CONSOLE_STATE_DIR")]
    pub state_dir: Option<PathBuf>,
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Resolve the state directory, falling back to the platform default.
    pub fn state_dir(&self) -> PathBuf {
        self.state_dir.clone().unwrap_or_else(crate::credential::state_dir)
    }

    pub fn session_file(&self) -> PathBuf {
        self.state_dir().join("session.json")
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout_ms: 30000,
            tenant_header: DEFAULT_TENANT_HEADER.to_owned(),
            refresh_path: DEFAULT_REFRESH_PATH.to_owned(),
            login_path: DEFAULT_LOGIN_PATH.to_owned(),
            public_paths: DEFAULT_PUBLIC_PATHS.iter().map(|p| (*p).to_owned()).collect(),
            context_exempt_paths: DEFAULT_CONTEXT_EXEMPT_PATHS
                .iter()
                .map(|p| (*p).to_owned())
                .collect(),
            login_redirect: DEFAULT_LOGIN_REDIRECT.to_owned(),
            state_dir: None,
        }
    }
}
