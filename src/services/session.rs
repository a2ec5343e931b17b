// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session cookie storage and "get current session".

use crate::error::AppError;
use crate::models::AuthSession;
use crate::services::cookies::CookiePolicy;
use crate::services::identity::{IdentityError, IdentityProvider};
use axum_extra::extract::cookie::CookieJar;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use time::Duration;

/// HttpOnly cookie carrying the provider session.
pub const SESSION_COOKIE: &str = "routineiq_session";

const SESSION_COOKIE_MAX_AGE: Duration = Duration::days(30);
/// Refresh when the access token has less than this left.
const REFRESH_SKEW_SECS: i64 = 60;

/// Serialize a session into a cookie-safe value.
pub fn encode_session(session: &AuthSession) -> Result<String, AppError> {
    let json = serde_json::to_vec(session)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Session encode failed: {}", e)))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

/// Parse a session cookie value. Malformed values read as no session.
pub fn decode_session(value: &str) -> Option<AuthSession> {
    let bytes = URL_SAFE_NO_PAD.decode(value).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Session currently stored in the jar, without refreshing.
pub fn session_from_jar(jar: &CookieJar) -> Option<AuthSession> {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| decode_session(cookie.value()))
}

pub fn store_session(
    jar: CookieJar,
    session: &AuthSession,
    policy: &CookiePolicy,
) -> Result<CookieJar, AppError> {
    let value = encode_session(session)?;
    Ok(jar.add(policy.build(SESSION_COOKIE, value, "/", SESSION_COOKIE_MAX_AGE)))
}

pub fn clear_session(jar: CookieJar, policy: &CookiePolicy) -> CookieJar {
    jar.add(policy.removal(SESSION_COOKIE, "/"))
}

/// Resolve the current session, refreshing it when close to expiry.
///
/// The returned jar carries any cookie update (refreshed session, or
/// removal of an unusable one). `Ok(None)` means "no session".
pub async fn current_session(
    identity: &dyn IdentityProvider,
    jar: CookieJar,
    policy: &CookiePolicy,
) -> (CookieJar, Result<Option<AuthSession>, IdentityError>) {
    let raw = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());
    let Some(raw) = raw else {
        return (jar, Ok(None));
    };
    let Some(session) = decode_session(&raw) else {
        tracing::debug!("Discarding malformed session cookie");
        return (clear_session(jar, policy), Ok(None));
    };

    let now = chrono::Utc::now().timestamp();
    if !session.expires_within(now, REFRESH_SKEW_SECS) {
        return (jar, Ok(Some(session)));
    }

    match identity.refresh_session(&session.refresh_token).await {
        Ok(refreshed) => {
            tracing::debug!(user_id = %refreshed.user.id, "Session refreshed");
            match store_session(jar.clone(), &refreshed, policy) {
                Ok(jar) => (jar, Ok(Some(refreshed))),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to store refreshed session");
                    (jar, Err(IdentityError::Decode(e.to_string())))
                }
            }
        }
        Err(IdentityError::InvalidSession) => {
            tracing::info!(user_id = %session.user.id, "Session expired, clearing cookie");
            (clear_session(jar, policy), Ok(None))
        }
        Err(e) => (jar, Err(e)),
    }
}
