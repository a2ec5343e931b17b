// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! RoutineIQ auth gateway: post-authentication routing and activation gating.
//!
//! This crate completes OAuth sign-ins (with a redirect intent that survives
//! the provider round trip), bridges the cookie session to bearer consumers,
//! and derives the onboarding activation state that the client-side gate
//! enforces.

pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use error::AppError;
use services::{ActivationEvaluator, CookiePolicy, IdentityProvider};
use std::sync::Arc;

/// Identity provider and data store, present only when configured.
pub struct Backend {
    pub identity: Arc<dyn IdentityProvider>,
    pub evaluator: ActivationEvaluator,
}

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub backend: Option<Backend>,
}

impl AppState {
    pub fn backend(&self) -> Result<&Backend, AppError> {
        self.backend.as_ref().ok_or(AppError::BackendNotConfigured)
    }

    pub fn cookie_policy(&self) -> CookiePolicy {
        CookiePolicy::from_config(&self.config)
    }
}
