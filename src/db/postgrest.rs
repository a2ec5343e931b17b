// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! PostgREST client with typed activation reads.
//!
//! Provides:
//! - Profile completeness fields (by user id)
//! - Existence checks on activity logs and reports (`limit=1`)

use crate::config::SupabaseConfig;
use crate::db::{tables, ActivationStore, RowScope, StoreError};
use crate::models::ProfileFields;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);
const PROFILE_COLUMNS: &str = "age_group,gender,job_family,work_mode";

/// PostgREST database client.
#[derive(Clone)]
pub struct PostgrestStore {
    http: reqwest::Client,
    rest_url: String,
    anon_key: String,
}

impl PostgrestStore {
    pub fn new(config: &SupabaseConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;
        Ok(Self {
            http,
            rest_url: format!("{}/rest/v1", config.url),
            anon_key: config.anon_key.clone(),
        })
    }

    /// `GET /rest/v1/{table}` with the given filters.
    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
        scope: RowScope<'_>,
    ) -> Result<Vec<T>, StoreError> {
        let response = self
            .http
            .get(format!("{}/{}", self.rest_url, table))
            .query(query)
            .header("apikey", &self.anon_key)
            .bearer_auth(scope.access_token)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status(status.as_u16(), body));
        }

        response
            .json()
            .await
            .map_err(|e| StoreError::Decode(format!("JSON parse error: {}", e)))
    }

    async fn any_row_for_user(&self, table: &str, scope: RowScope<'_>) -> Result<bool, StoreError> {
        let rows: Vec<serde_json::Value> = self
            .select(
                table,
                &[
                    ("select", "id".to_string()),
                    ("user_id", format!("eq.{}", scope.user_id)),
                    ("limit", "1".to_string()),
                ],
                scope,
            )
            .await?;
        Ok(!rows.is_empty())
    }
}

#[async_trait]
impl ActivationStore for PostgrestStore {
    async fn get_profile_fields(
        &self,
        scope: RowScope<'_>,
    ) -> Result<Option<ProfileFields>, StoreError> {
        let rows: Vec<ProfileFields> = self
            .select(
                tables::PROFILES,
                &[
                    ("select", PROFILE_COLUMNS.to_string()),
                    ("id", format!("eq.{}", scope.user_id)),
                    ("limit", "1".to_string()),
                ],
                scope,
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn has_any_log(&self, scope: RowScope<'_>) -> Result<bool, StoreError> {
        self.any_row_for_user(tables::ACTIVITY_LOGS, scope).await
    }

    async fn has_any_report(&self, scope: RowScope<'_>) -> Result<bool, StoreError> {
        self.any_row_for_user(tables::REPORTS, scope).await
    }
}
