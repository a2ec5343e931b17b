// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Post-auth redirect target sanitizing.
//!
//! Every `next` path that reaches a redirect goes through [`sanitize_next`].
//! Only same-origin paths survive; anything else collapses to a fallback, so
//! callers never have to handle a validation failure.

use crate::config::DEFAULT_NEXT_PATH;
use url::Url;

/// Non-routable origin used only to resolve candidates.
const PLACEHOLDER_ORIGIN: &str = "https://routineiq.invalid";

/// Sanitize a `next` candidate, falling back to [`DEFAULT_NEXT_PATH`].
pub fn sanitize_next(candidate: Option<&str>) -> String {
    sanitize_next_or(candidate, DEFAULT_NEXT_PATH)
}

/// Sanitize a `next` candidate against an explicit fallback.
///
/// Returns `pathname + search + hash` of the candidate resolved against a
/// placeholder origin, or `fallback` when the candidate is missing, is not
/// rooted at `/`, is protocol-relative, or resolves to a different origin
/// (e.g. `/\evil.com`, which WHATWG parsing treats as `//evil.com`).
pub fn sanitize_next_or(candidate: Option<&str>, fallback: &str) -> String {
    let Some(candidate) = candidate else {
        return fallback.to_string();
    };
    if !candidate.starts_with('/') || candidate.starts_with("//") {
        return fallback.to_string();
    }

    let Ok(base) = Url::parse(PLACEHOLDER_ORIGIN) else {
        return fallback.to_string();
    };
    let resolved = match base.join(candidate) {
        Ok(url) => url,
        Err(_) => return fallback.to_string(),
    };
    if resolved.origin() != base.origin() {
        return fallback.to_string();
    }

    // Dot segments can collapse to a leading "//" (e.g. "/.//evil.example")
    if resolved.path().starts_with("//") {
        return fallback.to_string();
    }

    let mut target = resolved.path().to_string();
    if let Some(query) = resolved.query().filter(|q| !q.is_empty()) {
        target.push('?');
        target.push_str(query);
    }
    if let Some(fragment) = resolved.fragment().filter(|f| !f.is_empty()) {
        target.push('#');
        target.push_str(fragment);
    }
    target
}
