// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use proptest::prelude::*;

use super::*;
use crate::config::DEFAULT_PUBLIC_PATHS;

fn public() -> PathRules {
    PathRules::new(DEFAULT_PUBLIC_PATHS)
}

#[yare::parameterized(
    login = { "/auth/login", true },
    register = { "/auth/register", true },
    refresh = { "/auth/refresh", true },
    init_root = { "/init", true },
    init_child = { "/init/database", true },
    init_nested = { "/init/database/status", true },
    login_query = { "/auth/login?redirect=%2F", true },
    login_trailing_slash = { "/auth/login/", true },
    absolute_url = { "http://backend:8080/auth/refresh", true },
    logout = { "/auth/logout", false },
    login_suffix = { "/auth/login-history", false },
    init_lookalike = { "/initial/setup", false },
    users = { "/system/users", false },
    root = { "/", false },
)]
fn public_allowlist(path: &str, expected: bool) {
    assert_eq!(public().matches(path), expected, "path {path}");
}

#[test]
fn every_default_pattern_matches_itself() {
    let rules = public();
    for pattern in DEFAULT_PUBLIC_PATHS {
        let path = pattern.trim_end_matches("/*");
        assert!(rules.matches(path), "{pattern} should be exempt");
    }
}

#[test]
fn empty_rules_match_nothing() {
    let rules = PathRules::new(Vec::<String>::new());
    assert!(!rules.matches("/auth/login"));
    assert!(!rules.matches("/"));
}

proptest! {
    #[test]
    fn anything_under_init_is_exempt(segment in "[a-z0-9_-]{1,12}", query in "[a-z=&]{0,8}") {
        let path = format!("/init/{segment}?{query}");
        prop_assert!(public().matches(&path));
    }

    #[test]
    fn protected_paths_are_not_exempt(segment in "[a-z]{1,12}") {
        let path = format!("/system/{segment}");
        prop_assert!(!public().matches(&path));
    }
}
