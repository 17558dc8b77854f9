// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Authentication interceptors and the single-flight token refresher.

pub mod headers;
pub mod recover;
pub mod refresh;

pub use headers::RequestInterceptor;
pub use recover::ErrorInterceptor;
pub use refresh::{Replayed, TokenRefresher};

/// A set of endpoint patterns matched against request paths.
///
/// A pattern ending in `/*` matches its prefix and everything beneath it;
/// any other pattern matches the path exactly. Query strings, fragments and
/// trailing slashes are ignored, and absolute URLs are reduced to their path.
#[derive(Debug, Clone, Default)]
pub struct PathRules {
    exact: Vec<String>,
    prefixes: Vec<String>,
}

impl PathRules {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut rules = Self::default();
        for pattern in patterns {
            let pattern = pattern.as_ref().trim();
            if pattern.is_empty() {
                continue;
            }
            match pattern.strip_suffix("/*") {
                Some(prefix) => rules.prefixes.push(normalize(prefix).to_owned()),
                None => rules.exact.push(normalize(pattern).to_owned()),
            }
        }
        rules
    }

    pub fn matches(&self, path: &str) -> bool {
        let path = normalize(path);
        self.exact.iter().any(|p| p == path)
            || self.prefixes.iter().any(|prefix| {
                path.strip_prefix(prefix.as_str())
                    .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
            })
    }
}

/// Reduce a request target to a bare path without query, fragment or trailing slash.
fn normalize(target: &str) -> &str {
    let mut path = target;
    if let Some(idx) = path.find(|c| c == '?' || c == '#') {
        path = &path[..idx];
    }
    if let Some(idx) = path.find("://") {
        let after_scheme = &path[idx + 3..];
        path = after_scheme.find('/').map_or("/", |i| &after_scheme[i..]);
    }
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
