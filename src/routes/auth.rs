// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth sign-in, post-auth completion, token bridge and logout routes.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::Duration;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::config::{LOGIN_BACKEND_ERROR_ROUTE, LOGIN_ROUTE};
use crate::error::{AppError, Result};
use crate::models::AuthSession;
use crate::services::identity::IdentityError;
use crate::services::intent::{RedirectIntent, POST_AUTH_NEXT_COOKIE};
use crate::services::pkce::{PkcePair, PKCE_VERIFIER_COOKIE};
use crate::services::session::{clear_session, current_session, session_from_jar, store_session};
use crate::{AppState, Backend};

/// Path the PKCE verifier cookie is scoped to.
const CALLBACK_PATH: &str = "/auth/callback";
const PKCE_MAX_AGE: Duration = Duration::minutes(10);
const MAX_PROVIDER_LEN: usize = 32;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/login", get(auth_start))
        .route("/auth/callback", get(auth_callback))
        .route("/auth/token", get(session_token))
        .route("/auth/logout", post(logout))
}

/// Query parameters for starting OAuth flow.
#[derive(Deserialize)]
pub struct AuthStartParams {
    /// Path to land on after sign-in completes.
    #[serde(default)]
    next: Option<String>,
    /// OAuth provider name; defaults to the configured one.
    #[serde(default)]
    provider: Option<String>,
}

/// Start OAuth flow: preserve `next`, set up PKCE, redirect to the provider.
async fn auth_start(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AuthStartParams>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect)> {
    let Some(backend) = state.backend.as_ref() else {
        tracing::error!("Sign-in started without identity backend configured");
        return Ok((jar, Redirect::temporary(LOGIN_BACKEND_ERROR_ROUTE)));
    };

    let provider = params
        .provider
        .unwrap_or_else(|| state.config.oauth_provider.clone());
    if !is_valid_provider(&provider) {
        return Err(AppError::BadRequest("Invalid provider".to_string()));
    }

    let policy = state.cookie_policy();
    let pkce = PkcePair::generate()?;

    let jar = RedirectIntent::preserve(jar, params.next.as_deref(), &policy);
    let jar = jar.add(policy.build(PKCE_VERIFIER_COOKIE, pkce.verifier, CALLBACK_PATH, PKCE_MAX_AGE));

    let auth_url =
        backend
            .identity
            .authorize_url(&provider, &state.config.callback_url(), &pkce.challenge);

    tracing::info!(provider = %provider, "Starting OAuth flow, redirecting to identity provider");

    Ok((jar, Redirect::temporary(&auth_url)))
}

#[derive(Default, Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    next: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// OAuth callback: exchange the code, store the session, honor the intent.
///
/// The intent and verifier cookies are consumed before branching, so every
/// response below clears them. An unparseable query (e.g. a repeated key)
/// is handled like a callback without a code.
async fn auth_callback(
    State(state): State<Arc<AppState>>,
    params: std::result::Result<Query<CallbackParams>, QueryRejection>,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    let params = match params {
        Ok(Query(params)) => params,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "Malformed auth callback query");
            CallbackParams::default()
        }
    };
    let policy = state.cookie_policy();
    let (intent, jar) = RedirectIntent::take(params.next.as_deref(), jar, &policy);
    let verifier = jar
        .get(PKCE_VERIFIER_COOKIE)
        .map(|c| c.value().to_string());
    let jar = jar.add(policy.removal(PKCE_VERIFIER_COOKIE, CALLBACK_PATH));

    let Some(backend) = state.backend.as_ref() else {
        tracing::error!("Auth callback hit without identity backend configured");
        return (jar, Redirect::temporary(LOGIN_BACKEND_ERROR_ROUTE));
    };

    if let Some(error) = params.error.as_deref() {
        tracing::warn!(
            error = %error,
            description = ?params.error_description,
            "OAuth error from identity provider"
        );
    }

    let Some(code) = params.code.as_deref().filter(|c| !c.is_empty()) else {
        return (jar, Redirect::temporary(LOGIN_ROUTE));
    };

    let session = match exchange_code(backend, code, verifier.as_deref()).await {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!(error = %e, "Code exchange failed");
            return (jar, Redirect::temporary(LOGIN_ROUTE));
        }
    };

    let jar = match store_session(jar.clone(), &session, &policy) {
        Ok(jar) => jar,
        Err(e) => {
            tracing::error!(error = %e, "Failed to store session");
            return (jar, Redirect::temporary(LOGIN_ROUTE));
        }
    };

    let target = intent.target();
    tracing::info!(user_id = %session.user.id, target = %target, "Sign-in completed");
    (jar, Redirect::temporary(&target))
}

async fn exchange_code(
    backend: &Backend,
    code: &str,
    verifier: Option<&str>,
) -> std::result::Result<AuthSession, IdentityError> {
    let verifier = verifier
        .filter(|v| !v.is_empty())
        .ok_or_else(|| IdentityError::Exchange("missing PKCE verifier".to_string()))?;
    backend
        .identity
        .exchange_code_for_session(code, verifier)
        .await
}

/// Token bridge response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TokenResponse {
    pub access_token: String,
}

/// Expose the cookie session's access token as a bearer credential.
///
/// Anything other than a usable session answers 401 without detail.
async fn session_token(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let Some(backend) = state.backend.as_ref() else {
        return (jar, AppError::Unauthorized).into_response();
    };

    let policy = state.cookie_policy();
    let (jar, session) = current_session(backend.identity.as_ref(), jar, &policy).await;

    match session {
        Ok(Some(session)) if session.has_valid_access_token(chrono::Utc::now().timestamp()) => (
            jar,
            [(header::CACHE_CONTROL, "no-store")],
            Json(TokenResponse {
                access_token: session.access_token,
            }),
        )
            .into_response(),
        Ok(_) => (jar, AppError::Unauthorized).into_response(),
        Err(e) => {
            tracing::debug!(error = %e, "Session lookup failed");
            (jar, AppError::Unauthorized).into_response()
        }
    }
}

/// Logout: revoke with the provider (best effort) and clear every auth cookie.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (CookieJar, StatusCode) {
    if let (Some(backend), Some(session)) = (state.backend.as_ref(), session_from_jar(&jar)) {
        if let Err(e) = backend.identity.sign_out(&session.access_token).await {
            tracing::warn!(error = %e, "Provider sign-out failed, clearing cookies anyway");
        }
    }

    let policy = state.cookie_policy();
    let jar = clear_session(jar, &policy)
        .add(policy.removal(POST_AUTH_NEXT_COOKIE, "/"))
        .add(policy.removal(PKCE_VERIFIER_COOKIE, CALLBACK_PATH));

    (jar, StatusCode::NO_CONTENT)
}

fn is_valid_provider(provider: &str) -> bool {
    !provider.is_empty()
        && provider.len() <= MAX_PROVIDER_LEN
        && provider
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_' || b == b'-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_names() {
        assert!(is_valid_provider("google"));
        assert!(is_valid_provider("azure-ad_2"));
        assert!(!is_valid_provider(""));
        assert!(!is_valid_provider("Google"));
        assert!(!is_valid_provider("google&redirect_to=x"));
        assert!(!is_valid_provider(&"a".repeat(33)));
    }
}
