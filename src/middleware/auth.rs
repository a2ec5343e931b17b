// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bearer/session authentication middleware.

use crate::models::User;
use crate::services::identity::IdentityError;
use crate::services::session::session_from_jar;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

/// Authenticated user, verified with the identity provider.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    /// Token the request was authenticated with (forwarded to the store)
    pub access_token: String,
}

/// Middleware that requires a token the identity provider accepts.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(backend) = state.backend.as_ref() else {
        tracing::error!("Protected route hit without identity backend");
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    };

    // Try header first (bridge consumers), then the session cookie
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(h) if h.starts_with("Bearer ") => h[7..].trim().to_string(),
        Some(_) => return Err(StatusCode::UNAUTHORIZED),
        None => session_from_jar(&jar)
            .map(|s| s.access_token)
            .ok_or(StatusCode::UNAUTHORIZED)?,
    };
    if token.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user = backend
        .identity
        .get_user(&token)
        .await
        .map_err(|e| match e {
            IdentityError::InvalidSession | IdentityError::Exchange(_) => StatusCode::UNAUTHORIZED,
            IdentityError::Transport(reason) | IdentityError::Decode(reason) => {
                tracing::error!(reason = %reason, "User lookup failed");
                StatusCode::BAD_GATEWAY
            }
        })?;

    request.extensions_mut().insert(AuthUser {
        user,
        access_token: token,
    });

    Ok(next.run(request).await)
}
