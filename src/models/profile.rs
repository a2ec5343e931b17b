// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile completeness fields.

use serde::{Deserialize, Serialize};

/// Placeholder stored for a profile question the user has not answered.
pub const UNKNOWN_SENTINEL: &str = "unknown";

/// The profile columns that onboarding must fill in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileFields {
    #[serde(default)]
    pub age_group: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub job_family: Option<String>,
    #[serde(default)]
    pub work_mode: Option<String>,
}

impl ProfileFields {
    /// Complete iff every field is non-empty after trimming and not `"unknown"`.
    pub fn is_complete(&self) -> bool {
        [
            &self.age_group,
            &self.gender,
            &self.job_family,
            &self.work_mode,
        ]
        .into_iter()
        .all(|field| is_filled(field.as_deref()))
    }
}

fn is_filled(value: Option<&str>) -> bool {
    match value.map(str::trim) {
        Some(v) => !v.is_empty() && v != UNKNOWN_SENTINEL,
        None => false,
    }
}
