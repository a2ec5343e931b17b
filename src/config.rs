// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! The identity/data backend is optional: a deployment without Supabase
//! settings still starts, and every auth route degrades to a login redirect
//! carrying an error indicator.

use std::env;
use std::time::Duration;

/// Login page, the target of every failed sign-in.
pub const LOGIN_ROUTE: &str = "/login";
/// Login page with the backend-misconfiguration indicator.
pub const LOGIN_BACKEND_ERROR_ROUTE: &str = "/login?error=supabase_env";
/// Default post-auth destination when no usable `next` path is supplied.
pub const DEFAULT_NEXT_PATH: &str = "/app";
/// Root of the area that requires a finished onboarding.
pub const PROTECTED_PREFIX: &str = "/app";
/// Main landing route for activated users.
pub const LANDING_ROUTE: &str = "/app/today";
/// Onboarding flow entry.
pub const ONBOARDING_ROUTE: &str = "/app/onboarding";
/// Routes an unactivated user may visit while finishing onboarding.
pub const ONBOARDING_SAFE_PREFIXES: [&str; 4] = [
    "/app/onboarding",
    "/app/log",
    "/app/reports",
    "/app/settings",
];

const DEFAULT_SITE_URL: &str = "http://localhost:3000";
const DEFAULT_OAUTH_PROVIDER: &str = "google";
const DEFAULT_MAX_STALENESS_SECS: u64 = 60;

/// Supabase project coordinates (auth + PostgREST share one base URL).
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project base URL, without trailing slash
    pub url: String,
    /// Public anon key, sent as `apikey` on every request
    pub anon_key: String,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Public origin of the web app (used for OAuth `redirect_to`)
    pub site_url: String,
    /// Server port
    pub port: u16,
    /// Identity/data backend, `None` when not configured
    pub supabase: Option<SupabaseConfig>,
    /// Provider used by `/auth/login` when none is requested
    pub oauth_provider: String,
    /// Extra origins allowed to call the token bridge with credentials
    pub allowed_origins: Vec<String>,
    /// Disables the onboarding gate for deterministic end-to-end runs
    pub e2e_test_mode: bool,
    /// How long a cached activation result is trusted by the gate
    pub activation_max_staleness: Duration,
}

impl Config {
    /// Config for tests only.
    pub fn test_default() -> Self {
        Self {
            site_url: "http://localhost:3000".to_string(),
            port: 8080,
            supabase: Some(SupabaseConfig {
                url: "http://localhost:54321".to_string(),
                anon_key: "test_anon_key".to_string(),
            }),
            oauth_provider: DEFAULT_OAUTH_PROVIDER.to_string(),
            allowed_origins: vec!["http://localhost:8000".to_string()],
            e2e_test_mode: false,
            activation_max_staleness: Duration::from_secs(DEFAULT_MAX_STALENESS_SECS),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let supabase = match (non_empty_var("SUPABASE_URL"), non_empty_var("SUPABASE_ANON_KEY")) {
            (Some(url), Some(anon_key)) => Some(SupabaseConfig {
                url: url.trim_end_matches('/').to_string(),
                anon_key,
            }),
            (None, None) => None,
            (url, _) => {
                tracing::warn!(
                    has_url = url.is_some(),
                    "Incomplete Supabase configuration, running without identity backend"
                );
                None
            }
        };

        let activation_max_staleness = match non_empty_var("ACTIVATION_MAX_STALENESS_SECS") {
            Some(v) => Duration::from_secs(
                v.parse()
                    .map_err(|_| ConfigError::Invalid("ACTIVATION_MAX_STALENESS_SECS", v))?,
            ),
            None => Duration::from_secs(DEFAULT_MAX_STALENESS_SECS),
        };

        Ok(Self {
            site_url: non_empty_var("SITE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_SITE_URL.to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            supabase,
            oauth_provider: non_empty_var("OAUTH_PROVIDER")
                .unwrap_or_else(|| DEFAULT_OAUTH_PROVIDER.to_string()),
            allowed_origins: non_empty_var("CORS_ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|o| o.trim().trim_end_matches('/').to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            e2e_test_mode: non_empty_var("E2E_TEST_MODE")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
            activation_max_staleness,
        })
    }

    /// Whether cookies must carry the `Secure` attribute.
    pub fn cookie_secure(&self) -> bool {
        self.site_url.starts_with("https://")
    }

    /// Absolute URL the identity provider sends the browser back to.
    pub fn callback_url(&self) -> String {
        format!("{}/auth/callback", self.site_url)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
