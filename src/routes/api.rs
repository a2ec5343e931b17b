// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::ActivationStatus;
use crate::AppState;
use axum::{
    extract::State,
    http::{header, HeaderName},
    routing::get,
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// API routes (require authentication).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/activation", get(get_activation))
}

// ─── User ────────────────────────────────────────────────────

/// Current user response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserResponse {
    pub id: String,
    pub email: Option<String>,
}

async fn get_me(Extension(auth): Extension<AuthUser>) -> Json<UserResponse> {
    Json(UserResponse {
        id: auth.user.id,
        email: auth.user.email,
    })
}

// ─── Activation ──────────────────────────────────────────────

/// Activation state as consumed by the client-side gate.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivationResponse {
    pub activated: bool,
    pub profile_complete: bool,
    pub has_any_log: bool,
    pub has_any_report: bool,
}

impl From<ActivationStatus> for ActivationResponse {
    fn from(status: ActivationStatus) -> Self {
        Self {
            activated: status.is_activated(),
            profile_complete: status.profile_complete,
            has_any_log: status.has_any_log,
            has_any_report: status.has_any_report,
        }
    }
}

/// Freshly derived activation for the current user. Never cacheable.
async fn get_activation(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<([(HeaderName, &'static str); 1], Json<ActivationResponse>)> {
    let backend = state.backend()?;
    let status = backend
        .evaluator
        .evaluate(&auth.user, &auth.access_token)
        .await?;

    Ok((
        [(header::CACHE_CONTROL, "no-store")],
        Json(ActivationResponse::from(status)),
    ))
}
