// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cookie attribute policy shared by every cookie this service writes.

use crate::config::Config;
use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

/// Attributes common to the session, intent and PKCE cookies.
#[derive(Debug, Clone, Copy)]
pub struct CookiePolicy {
    pub secure: bool,
}

impl CookiePolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            secure: config.cookie_secure(),
        }
    }

    /// Build an HttpOnly, SameSite=Lax cookie.
    pub fn build(
        &self,
        name: &'static str,
        value: String,
        path: &'static str,
        max_age: Duration,
    ) -> Cookie<'static> {
        Cookie::build((name, value))
            .path(path)
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(max_age)
            .build()
    }

    /// Cookie that clears `name` (empty value, `Max-Age=0`).
    ///
    /// Added to the jar rather than removed from it, so the clearing
    /// `Set-Cookie` is emitted even when the request did not carry the cookie.
    pub fn removal(&self, name: &'static str, path: &'static str) -> Cookie<'static> {
        let mut cookie = self.build(name, String::new(), path, Duration::ZERO);
        cookie.make_removal();
        cookie
    }
}
