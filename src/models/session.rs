// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Auth session model.

use super::user::User;
use serde::{Deserialize, Serialize};

/// Session issued by the identity provider.
///
/// Never stored server-side. It travels in the session cookie and is
/// re-read (and refreshed if close to expiry) on each request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    /// Bearer credential for the provider and the data API
    pub access_token: String,
    /// Single-use refresh token
    pub refresh_token: String,
    /// Access token expiry (Unix timestamp, seconds)
    pub expires_at: i64,
    pub user: User,
}

impl AuthSession {
    /// Whether the access token expires within `skew_secs` of `now`.
    pub fn expires_within(&self, now: i64, skew_secs: i64) -> bool {
        self.expires_at <= now + skew_secs
    }

    /// Whether the session carries a usable access credential at `now`.
    pub fn has_valid_access_token(&self, now: i64) -> bool {
        !self.access_token.trim().is_empty() && self.expires_at > now
    }
}
