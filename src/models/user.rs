//! Identity provider user model.

use serde::{Deserialize, Serialize};

/// User as reported by the identity provider's "get current user".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Provider user ID (UUID string, also the key of the profile row)
    pub id: String,
    /// Email address (absent for some OAuth providers)
    #[serde(default)]
    pub email: Option<String>,
}
