// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `consolectl`: drive the pipeline from the command line.
//!
//! The session is loaded from `<state_dir>/session.json` before each command
//! and written back afterwards, so a refresh performed by one invocation is
//! visible to the next.

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::sync::broadcast;

use crate::client::ApiClient;
use crate::config::ClientConfig;
use crate::credential::persist;
use crate::credential::{AuthEvent, CredentialStore, MemoryStore};
use crate::request::ApiRequest;
use crate::transport::{HttpTransport, Transport};

#[derive(Debug, Parser)]
#[command(name = "consolectl", version, about = "Authenticated client for the console backend")]
pub struct Cli {
    #[command(flatten)]
    pub config: ClientConfig,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and store the issued tokens.
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "CONSOLE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session.
    Logout,
    /// Select (or clear) the tenant/project scope sent with requests.
    Tenant {
        id: Option<String>,
        #[arg(long, conflicts_with = "id")]
        clear: bool,
    },
    /// Send a request through the pipeline and print the JSON body.
    Request {
        method: String,
        path: String,
        /// JSON request body.
        #[arg(long)]
        data: Option<String>,
    },
    /// Show whether a session is stored.
    Status,
}

/// Execute one command against the configured backend.
pub async fn run(config: ClientConfig, command: Command) -> anyhow::Result<()> {
    let session_file = config.session_file();
    let session = persist::load_or_default(&session_file)
        .with_context(|| format!("reading {}", session_file.display()))?;
    let store = Arc::new(MemoryStore::from_persisted(session));
    let transport = Arc::new(HttpTransport::new(&config.base_url, config.timeout())?);
    let client = ApiClient::new(
        &config,
        Arc::clone(&store) as Arc<dyn CredentialStore>,
        transport as Arc<dyn Transport>,
    );
    spawn_event_logger(client.subscribe());

    let result = execute(&client, command).await;

    persist::save(&session_file, &store.to_persisted())
        .with_context(|| format!("writing {}", session_file.display()))?;
    result
}

async fn execute(client: &ApiClient, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Login { username, password } => {
            client.login(&username, &password).await?;
            println!("signed in as {username}");
        }
        Command::Logout => {
            client.logout();
            println!("signed out");
        }
        Command::Tenant { id, clear } => {
            if clear {
                client.select_tenant(None);
                println!("tenant cleared");
            } else if let Some(id) = id {
                println!("tenant set to {id}");
                client.select_tenant(Some(id));
            } else {
                let tenant = client.store().credentials().tenant_id;
                println!("{}", tenant.as_deref().unwrap_or("(none)"));
            }
        }
        Command::Request { method, path, data } => {
            let request = build_request(&method, path, data.as_deref())?;
            let resp = client.send(request).await?;
            println!("{}", serde_json::to_string_pretty(&resp.body)?);
        }
        Command::Status => {
            let creds = client.store().credentials();
            println!(
                "authenticated: {}\nrefresh token: {}\ntenant: {}",
                creds.is_authenticated(),
                if creds.refresh_token.is_some() { "stored" } else { "none" },
                creds.tenant_id.as_deref().unwrap_or("(none)"),
            );
        }
    }
    Ok(())
}

fn build_request(method: &str, path: String, data: Option<&str>) -> anyhow::Result<ApiRequest> {
    let method = reqwest::Method::from_bytes(method.to_uppercase().as_bytes())
        .with_context(|| format!("invalid method {method}"))?;
    let mut request = ApiRequest::new(method, path);
    if let Some(data) = data {
        request = request.json(serde_json::from_str(data).context("--data is not valid JSON")?);
    }
    Ok(request)
}

/// Log session events until the client is dropped.
fn spawn_event_logger(mut rx: broadcast::Receiver<AuthEvent>) {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(AuthEvent::Refreshed { .. }) => tracing::info!("session renewed"),
                Ok(AuthEvent::RefreshFailed { error }) => {
                    tracing::warn!(err = %error, "session renewal failed")
                }
                Ok(AuthEvent::LoggedOut { redirect }) => {
                    tracing::info!(redirect = %redirect, "session ended")
                }
                Ok(AuthEvent::LoggedIn) => tracing::debug!("session started"),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::debug!(skipped = n, "event logger lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}
