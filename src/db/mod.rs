//! Data layer (Supabase PostgREST).

pub mod postgrest;

pub use postgrest::PostgrestStore;

use crate::error::AppError;
use crate::models::ProfileFields;
use async_trait::async_trait;

/// Table names as constants.
pub mod tables {
    pub const PROFILES: &str = "profiles";
    pub const ACTIVITY_LOGS: &str = "activity_logs";
    pub const REPORTS: &str = "ai_reports";
}

/// Rows are read on behalf of one user, with that user's token, so the
/// store's row-level security applies.
#[derive(Debug, Clone, Copy)]
pub struct RowScope<'a> {
    pub user_id: &'a str,
    pub access_token: &'a str,
}

/// Store failure categories.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store request failed: {0}")]
    Transport(String),

    #[error("Store returned HTTP {0}: {1}")]
    Status(u16, String),

    #[error("Unexpected store response: {0}")]
    Decode(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Database(err.to_string())
    }
}

/// The three reads activation is derived from.
#[async_trait]
pub trait ActivationStore: Send + Sync {
    /// Profile completeness fields, `None` when the user has no profile row.
    async fn get_profile_fields(
        &self,
        scope: RowScope<'_>,
    ) -> Result<Option<ProfileFields>, StoreError>;

    /// Whether at least one activity log row exists.
    async fn has_any_log(&self, scope: RowScope<'_>) -> Result<bool, StoreError>;

    /// Whether at least one report row exists.
    async fn has_any_report(&self, scope: RowScope<'_>) -> Result<bool, StoreError>;
}
