// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Post-auth redirect intent carried across the OAuth round trip.

use crate::services::cookies::CookiePolicy;
use crate::services::redirect::sanitize_next;
use axum_extra::extract::cookie::CookieJar;
use time::Duration;

/// Cookie holding the preserved `next` path during sign-in.
pub const POST_AUTH_NEXT_COOKIE: &str = "routineiq_post_auth_next";

/// Lifetime of a preserved intent; one sign-in round trip.
const INTENT_MAX_AGE: Duration = Duration::minutes(10);

/// Where the user wanted to go before signing in.
///
/// An intent is obtained only through [`RedirectIntent::take`], which also
/// queues the clearing of the preservation cookie. Holding a `RedirectIntent`
/// therefore means the cookie is already consumed for this attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectIntent {
    next: Option<String>,
}

impl RedirectIntent {
    /// Preserve `next` for the upcoming OAuth round trip.
    ///
    /// The value is sanitized before it is stored; it is sanitized again when
    /// consumed.
    pub fn preserve(jar: CookieJar, next: Option<&str>, policy: &CookiePolicy) -> CookieJar {
        let target = sanitize_next(next);
        jar.add(policy.build(POST_AUTH_NEXT_COOKIE, target, "/", INTENT_MAX_AGE))
    }

    /// Consume the intent for one completion attempt.
    ///
    /// A non-empty `query_next` wins over the cookie. The returned jar always
    /// carries the clearing cookie.
    pub fn take(query_next: Option<&str>, jar: CookieJar, policy: &CookiePolicy) -> (Self, CookieJar) {
        let from_cookie = jar
            .get(POST_AUTH_NEXT_COOKIE)
            .map(|c| decode_cookie_value(c.value()));
        let next = query_next
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .or(from_cookie);

        let jar = jar.add(policy.removal(POST_AUTH_NEXT_COOKIE, "/"));
        (Self { next }, jar)
    }

    /// Sanitized redirect target.
    pub fn target(&self) -> String {
        sanitize_next(self.next.as_deref())
    }
}

/// The jar percent-decodes cookie values; values written by other clients
/// may still arrive encoded.
fn decode_cookie_value(raw: &str) -> String {
    if raw.starts_with('/') {
        return raw.to_string();
    }
    urlencoding::decode(raw)
        .map(|v| v.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}
