// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity provider interface.
//!
//! The provider owns credentials and session lifetime; this service only
//! exchanges codes, refreshes, and asks "who is this token".

use crate::error::AppError;
use crate::models::{AuthSession, User};
use async_trait::async_trait;

/// Identity provider failure categories.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The provider rejected the one-time code (or the PKCE verifier).
    #[error("Code exchange failed: {0}")]
    Exchange(String),
    /// The token or refresh token is no longer accepted.
    #[error("Session is not valid")]
    InvalidSession,
    /// The provider could not be reached or answered with a server error.
    #[error("Identity provider request failed: {0}")]
    Transport(String),
    /// The provider answered with a body we could not read.
    #[error("Unexpected identity provider response: {0}")]
    Decode(String),
}

impl From<IdentityError> for AppError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::InvalidSession | IdentityError::Exchange(_) => AppError::Unauthorized,
            IdentityError::Transport(msg) | IdentityError::Decode(msg) => AppError::Identity(msg),
        }
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// URL that starts an OAuth sign-in with `provider`.
    fn authorize_url(&self, provider: &str, redirect_to: &str, code_challenge: &str) -> String;

    /// Exchange a one-time authorization code for a session.
    async fn exchange_code_for_session(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<AuthSession, IdentityError>;

    /// Trade a refresh token for a new session.
    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, IdentityError>;

    /// Resolve the user that owns `access_token`.
    async fn get_user(&self, access_token: &str) -> Result<User, IdentityError>;

    /// Revoke the session behind `access_token`.
    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError>;
}
