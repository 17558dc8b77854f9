// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Failure of a single API request, as seen by the caller.
///
/// Cloneable so the error interceptor can keep the original failure while the
/// refresher hands a copy to queued waiters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The backend answered with a non-success status.
    #[error("{method} {path} returned {status}")]
    Status { method: String, path: String, status: u16, body: String },

    /// No response was received (connect, DNS, timeout, ...).
    #[error("{path}: transport error: {message}")]
    Transport { path: String, message: String },

    /// A success response whose body could not be parsed.
    #[error("{path}: invalid response body: {message}")]
    Decode { path: String, message: String },
}

impl ApiError {
    /// HTTP status carried by this failure, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport { .. } | Self::Decode { .. } => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    pub fn path(&self) -> &str {
        match self {
            Self::Status { path, .. } | Self::Transport { path, .. } | Self::Decode { path, .. } => {
                path
            }
        }
    }
}

/// Why a refresh-and-retry cycle did not produce a response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshError {
    #[error("no refresh token stored")]
    MissingRefreshToken,

    #[error("refresh rejected with status {status}")]
    Rejected { status: u16 },

    #[error("refresh request failed: {0}")]
    Transport(String),

    #[error("refresh response carried no access token")]
    MissingAccessToken,

    /// The refresh succeeded but the replayed request still failed.
    #[error("replayed request failed: {0}")]
    Replay(ApiError),
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
