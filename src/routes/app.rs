// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Entry route: picks the initial landing page from activation.

use axum::{extract::State, response::Redirect, routing::get, Router};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use crate::config::{LANDING_ROUTE, LOGIN_BACKEND_ERROR_ROUTE, LOGIN_ROUTE, ONBOARDING_ROUTE};
use crate::services::session::current_session;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/app", get(app_entry))
}

/// Send the user to the main app or to onboarding.
async fn app_entry(State(state): State<Arc<AppState>>, jar: CookieJar) -> (CookieJar, Redirect) {
    let Some(backend) = state.backend.as_ref() else {
        return (jar, Redirect::temporary(LOGIN_BACKEND_ERROR_ROUTE));
    };

    let policy = state.cookie_policy();
    let (jar, session) = current_session(backend.identity.as_ref(), jar, &policy).await;
    let session = match session {
        Ok(Some(session)) => session,
        Ok(None) => return (jar, Redirect::temporary(LOGIN_ROUTE)),
        Err(e) => {
            tracing::warn!(error = %e, "Session lookup failed at entry");
            return (jar, Redirect::temporary(LOGIN_ROUTE));
        }
    };

    let user = match backend.identity.get_user(&session.access_token).await {
        Ok(user) => user,
        Err(e) => {
            tracing::info!(error = %e, "Could not identify user at entry");
            return (jar, Redirect::temporary(LOGIN_ROUTE));
        }
    };

    match backend.evaluator.evaluate(&user, &session.access_token).await {
        Ok(status) if status.is_activated() => (jar, Redirect::temporary(LANDING_ROUTE)),
        Ok(_) => (jar, Redirect::temporary(ONBOARDING_ROUTE)),
        Err(e) => {
            tracing::warn!(error = %e, user_id = %user.id, "Activation evaluation failed at entry");
            (jar, Redirect::temporary(LOGIN_ROUTE))
        }
    }
}
