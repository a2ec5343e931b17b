// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Supabase Auth (GoTrue) client.
//!
//! Handles:
//! - OAuth authorize URL construction (PKCE, S256)
//! - Code exchange and token refresh
//! - Current-user lookup and sign-out

use crate::config::SupabaseConfig;
use crate::models::{AuthSession, User};
use crate::services::identity::{IdentityError, IdentityProvider};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);
/// Used when the provider omits both `expires_at` and `expires_in`.
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// Supabase Auth API client.
#[derive(Clone)]
pub struct SupabaseAuth {
    http: reqwest::Client,
    auth_url: String,
    anon_key: String,
}

impl SupabaseAuth {
    pub fn new(config: &SupabaseConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;
        Ok(Self {
            http,
            auth_url: format!("{}/auth/v1", config.url),
            anon_key: config.anon_key.clone(),
        })
    }

    async fn token_grant(
        &self,
        grant_type: &str,
        body: serde_json::Value,
    ) -> Result<TokenResponse, GrantFailure> {
        let response = self
            .http
            .post(format!("{}/token", self.auth_url))
            .query(&[("grant_type", grant_type)])
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GrantFailure::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let client_error = response.status().is_client_error();
            let message = error_message(response).await;
            return Err(GrantFailure::Rejected {
                client_error,
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| GrantFailure::Transport(format!("JSON parse error: {}", e)))
    }
}

/// Why a token grant did not produce a token.
enum GrantFailure {
    Rejected { client_error: bool, message: String },
    Transport(String),
}

#[async_trait]
impl IdentityProvider for SupabaseAuth {
    fn authorize_url(&self, provider: &str, redirect_to: &str, code_challenge: &str) -> String {
        format!(
            "{}/authorize?provider={}&redirect_to={}&code_challenge={}&code_challenge_method=s256",
            self.auth_url,
            urlencoding::encode(provider),
            urlencoding::encode(redirect_to),
            urlencoding::encode(code_challenge),
        )
    }

    async fn exchange_code_for_session(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<AuthSession, IdentityError> {
        let body = serde_json::json!({
            "auth_code": code,
            "code_verifier": code_verifier,
        });

        match self.token_grant("pkce", body).await {
            Ok(token) => token
                .into_session(chrono::Utc::now().timestamp())
                .ok_or_else(|| IdentityError::Exchange("incomplete token response".to_string())),
            Err(GrantFailure::Rejected { message, .. }) | Err(GrantFailure::Transport(message)) => {
                Err(IdentityError::Exchange(message))
            }
        }
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, IdentityError> {
        let body = serde_json::json!({ "refresh_token": refresh_token });

        match self.token_grant("refresh_token", body).await {
            Ok(token) => token
                .into_session(chrono::Utc::now().timestamp())
                .ok_or_else(|| IdentityError::Decode("incomplete token response".to_string())),
            Err(GrantFailure::Rejected {
                client_error: true,
                message,
            }) => {
                tracing::debug!(reason = %message, "Refresh token rejected");
                Err(IdentityError::InvalidSession)
            }
            Err(GrantFailure::Rejected { message, .. }) | Err(GrantFailure::Transport(message)) => {
                Err(IdentityError::Transport(message))
            }
        }
    }

    async fn get_user(&self, access_token: &str) -> Result<User, IdentityError> {
        let response = self
            .http
            .get(format!("{}/user", self.auth_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| IdentityError::Transport(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(IdentityError::InvalidSession);
        }
        if !status.is_success() {
            return Err(IdentityError::Transport(error_message(response).await));
        }

        response
            .json()
            .await
            .map_err(|e| IdentityError::Decode(format!("JSON parse error: {}", e)))
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError> {
        let response = self
            .http
            .post(format!("{}/logout", self.auth_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| IdentityError::Transport(e.to_string()))?;

        // 401/404 mean the session is already gone.
        let status = response.status();
        if status.is_success() || status.as_u16() == 401 || status.as_u16() == 404 {
            return Ok(());
        }
        Err(IdentityError::Transport(error_message(response).await))
    }
}

/// Token response shared by the `pkce` and `refresh_token` grants.
#[derive(Debug, Default, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: String,
    #[serde(default)]
    refresh_token: String,
    expires_at: Option<i64>,
    expires_in: Option<i64>,
    user: Option<User>,
}

impl TokenResponse {
    fn into_session(self, now: i64) -> Option<AuthSession> {
        if self.access_token.is_empty() || self.refresh_token.is_empty() {
            return None;
        }
        let expires_at = self
            .expires_at
            .unwrap_or_else(|| now + self.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS));
        Some(AuthSession {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user?,
        })
    }
}

/// GoTrue error bodies use several shapes across versions.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

async fn error_message(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let parsed: ErrorBody = serde_json::from_str(&body).unwrap_or_default();
    let detail = parsed
        .error_description
        .or(parsed.msg)
        .or(parsed.message)
        .or(parsed.error)
        .unwrap_or(body);
    format!("HTTP {}: {}", status, detail)
}
