// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activation evaluation: profile completeness + any log + any report.

use crate::db::{ActivationStore, RowScope};
use crate::error::AppError;
use crate::models::{ActivationStatus, SourceResult, User};
use std::sync::Arc;

/// Derives a user's activation from the store on every call.
#[derive(Clone)]
pub struct ActivationEvaluator {
    store: Arc<dyn ActivationStore>,
}

impl ActivationEvaluator {
    pub fn new(store: Arc<dyn ActivationStore>) -> Self {
        Self { store }
    }

    /// Evaluate activation for an identified user.
    ///
    /// The three reads run concurrently. A read that fails or finds nothing
    /// makes its part incomplete; only an unidentified user is an error.
    pub async fn evaluate(
        &self,
        user: &User,
        access_token: &str,
    ) -> Result<ActivationStatus, AppError> {
        if user.id.trim().is_empty() {
            return Err(AppError::Unauthorized);
        }
        let scope = RowScope {
            user_id: &user.id,
            access_token,
        };

        let (profile, logs, reports) = tokio::join!(
            self.store.get_profile_fields(scope),
            self.store.has_any_log(scope),
            self.store.has_any_report(scope),
        );

        let status = ActivationStatus::reduce(
            SourceResult::from_read("profile", profile.map(|p| p.is_some_and(|p| p.is_complete()))),
            SourceResult::from_read("activity_logs", logs),
            SourceResult::from_read("reports", reports),
        );

        tracing::debug!(
            user_id = %user.id,
            profile_complete = status.profile_complete,
            has_any_log = status.has_any_log,
            has_any_report = status.has_any_report,
            activated = status.is_activated(),
            "Activation evaluated"
        );

        Ok(status)
    }
}
