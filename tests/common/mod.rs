// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use axum::http::{header, Response};
use routineiq_gateway::config::Config;
use routineiq_gateway::db::{ActivationStore, RowScope, StoreError};
use routineiq_gateway::models::{AuthSession, ProfileFields, User};
use routineiq_gateway::routes::create_router;
use routineiq_gateway::services::session::encode_session;
use routineiq_gateway::services::{ActivationEvaluator, IdentityError, IdentityProvider};
use routineiq_gateway::{AppState, Backend};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Far-future expiry (2100-01-01).
#[allow(dead_code)]
pub const FAR_FUTURE: i64 = 4_102_444_800;

#[allow(dead_code)]
pub fn test_user(id: &str) -> User {
    User {
        id: id.to_string(),
        email: Some(format!("{id}@example.com")),
    }
}

#[allow(dead_code)]
pub fn test_session(user_id: &str, access_token: &str, expires_at: i64) -> AuthSession {
    AuthSession {
        access_token: access_token.to_string(),
        refresh_token: format!("refresh-{access_token}"),
        expires_at,
        user: test_user(user_id),
    }
}

/// In-memory identity provider.
#[derive(Default)]
pub struct FakeIdentity {
    /// code -> session issued for it
    pub codes: HashMap<String, AuthSession>,
    /// refresh token -> refreshed session
    pub refreshes: HashMap<String, AuthSession>,
    /// access token -> user
    pub users: HashMap<String, User>,
    /// Verifiers seen by the code exchange (shared with the test)
    pub exchanged_verifiers: Arc<Mutex<Vec<String>>>,
    /// Access tokens revoked by sign-out (shared with the test)
    pub signed_out: Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl FakeIdentity {
    pub fn with_code(mut self, code: &str, session: AuthSession) -> Self {
        self.users
            .insert(session.access_token.clone(), session.user.clone());
        self.codes.insert(code.to_string(), session);
        self
    }

    pub fn with_refresh(mut self, refresh_token: &str, session: AuthSession) -> Self {
        self.users
            .insert(session.access_token.clone(), session.user.clone());
        self.refreshes.insert(refresh_token.to_string(), session);
        self
    }

    pub fn with_user(mut self, access_token: &str, user: User) -> Self {
        self.users.insert(access_token.to_string(), user);
        self
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    fn authorize_url(&self, provider: &str, redirect_to: &str, code_challenge: &str) -> String {
        format!(
            "https://idp.test/authorize?provider={}&redirect_to={}&code_challenge={}",
            provider,
            urlencoding::encode(redirect_to),
            code_challenge
        )
    }

    async fn exchange_code_for_session(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<AuthSession, IdentityError> {
        self.exchanged_verifiers
            .lock()
            .unwrap()
            .push(code_verifier.to_string());
        self.codes
            .get(code)
            .cloned()
            .ok_or_else(|| IdentityError::Exchange("invalid flow state".to_string()))
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, IdentityError> {
        self.refreshes
            .get(refresh_token)
            .cloned()
            .ok_or(IdentityError::InvalidSession)
    }

    async fn get_user(&self, access_token: &str) -> Result<User, IdentityError> {
        self.users
            .get(access_token)
            .cloned()
            .ok_or(IdentityError::InvalidSession)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError> {
        self.signed_out
            .lock()
            .unwrap()
            .push(access_token.to_string());
        Ok(())
    }
}

/// Activation rows for one user.
#[derive(Clone, Default)]
pub struct UserRows {
    pub profile: Option<ProfileFields>,
    pub logs: usize,
    pub reports: usize,
}

#[allow(dead_code)]
impl UserRows {
    pub fn activated() -> Self {
        Self {
            profile: Some(complete_profile()),
            logs: 3,
            reports: 1,
        }
    }
}

#[allow(dead_code)]
pub fn complete_profile() -> ProfileFields {
    ProfileFields {
        age_group: Some("25_34".to_string()),
        gender: Some("female".to_string()),
        job_family: Some("engineering".to_string()),
        work_mode: Some("hybrid".to_string()),
    }
}

/// In-memory activation store.
#[derive(Default)]
pub struct MemoryStore {
    pub rows: Mutex<HashMap<String, UserRows>>,
    /// When set, report reads fail.
    pub reports_unavailable: bool,
}

#[allow(dead_code)]
impl MemoryStore {
    pub fn with_user(self, user_id: &str, rows: UserRows) -> Self {
        self.rows.lock().unwrap().insert(user_id.to_string(), rows);
        self
    }

    fn rows_for(&self, user_id: &str) -> UserRows {
        self.rows
            .lock()
            .unwrap()
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl ActivationStore for MemoryStore {
    async fn get_profile_fields(
        &self,
        scope: RowScope<'_>,
    ) -> Result<Option<ProfileFields>, StoreError> {
        Ok(self.rows_for(scope.user_id).profile)
    }

    async fn has_any_log(&self, scope: RowScope<'_>) -> Result<bool, StoreError> {
        Ok(self.rows_for(scope.user_id).logs > 0)
    }

    async fn has_any_report(&self, scope: RowScope<'_>) -> Result<bool, StoreError> {
        if self.reports_unavailable {
            return Err(StoreError::Status(503, "unavailable".to_string()));
        }
        Ok(self.rows_for(scope.user_id).reports > 0)
    }
}

/// Create a test app over in-memory fakes.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app(
    identity: FakeIdentity,
    store: MemoryStore,
) -> (axum::Router, Arc<AppState>) {
    create_test_app_with_config(Config::test_default(), identity, store)
}

#[allow(dead_code)]
pub fn create_test_app_with_config(
    config: Config,
    identity: FakeIdentity,
    store: MemoryStore,
) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState {
        config,
        backend: Some(Backend {
            identity: Arc::new(identity),
            evaluator: ActivationEvaluator::new(Arc::new(store)),
        }),
    });
    (create_router(state.clone()), state)
}

/// Create a test app with no identity backend configured.
#[allow(dead_code)]
pub fn create_unconfigured_app() -> axum::Router {
    let mut config = Config::test_default();
    config.supabase = None;
    create_router(Arc::new(AppState {
        config,
        backend: None,
    }))
}

/// `Cookie` header value carrying `session`.
#[allow(dead_code)]
pub fn session_cookie(session: &AuthSession) -> String {
    format!("routineiq_session={}", encode_session(session).unwrap())
}

#[allow(dead_code)]
pub fn set_cookie_headers<B>(response: &Response<B>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

#[allow(dead_code)]
pub fn find_cookie(headers: &[String], name: &str) -> String {
    headers
        .iter()
        .find(|value| value.starts_with(&format!("{name}=")))
        .cloned()
        .unwrap_or_else(|| panic!("missing Set-Cookie header for {name}: {headers:?}"))
}

/// `name=value` part of a Set-Cookie header.
#[allow(dead_code)]
pub fn cookie_pair(set_cookie: &str) -> String {
    set_cookie.split(';').next().unwrap().to_string()
}

#[allow(dead_code)]
pub fn is_cleared(set_cookie: &str) -> bool {
    let pair = cookie_pair(set_cookie);
    pair.ends_with('=') && set_cookie.contains("Max-Age=0")
}

#[allow(dead_code)]
pub fn location<B>(response: &Response<B>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("redirect without Location")
        .to_str()
        .unwrap()
        .to_string()
}

#[allow(dead_code)]
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
