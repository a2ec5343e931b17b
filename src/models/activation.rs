// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activation state, derived from three independent sources.

use serde::{Deserialize, Serialize};

/// Outcome of reading one activation source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceResult {
    /// The source answered.
    Known(bool),
    /// The source could not be read. Counts as "not satisfied".
    Unknown,
}

impl SourceResult {
    /// Fold a store read into a source result, logging failures.
    pub fn from_read<E: std::fmt::Display>(source: &'static str, read: Result<bool, E>) -> Self {
        match read {
            Ok(value) => SourceResult::Known(value),
            Err(e) => {
                tracing::warn!(source, error = %e, "Activation source unavailable");
                SourceResult::Unknown
            }
        }
    }

    pub fn is_satisfied(self) -> bool {
        matches!(self, SourceResult::Known(true))
    }
}

/// Reduced activation facts for one user. Never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationStatus {
    pub profile_complete: bool,
    pub has_any_log: bool,
    pub has_any_report: bool,
}

impl ActivationStatus {
    /// Reduce the three source results. Unknown is treated as incomplete.
    pub fn reduce(profile: SourceResult, logs: SourceResult, reports: SourceResult) -> Self {
        Self {
            profile_complete: profile.is_satisfied(),
            has_any_log: logs.is_satisfied(),
            has_any_report: reports.is_satisfied(),
        }
    }

    pub fn is_activated(&self) -> bool {
        self.profile_complete && self.has_any_log && self.has_any_report
    }
}
