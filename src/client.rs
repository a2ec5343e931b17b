// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP activation source for the onboarding gate.
//!
//! Consumers on another origin first obtain a bearer token from
//! `GET /auth/token` (cookie session), then poll `GET /api/activation`.

use crate::error::AppError;
use crate::models::ActivationStatus;
use crate::services::gate::{ActivationSource, Freshness};
use async_trait::async_trait;
use reqwest::header::{CACHE_CONTROL, COOKIE};
use serde::Deserialize;
use std::time::Duration;

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Deserialize)]
struct TokenBody {
    access_token: String,
}

/// Fetch a bearer token from the token bridge using the browser's cookies.
pub async fn fetch_bearer_token(
    http: &reqwest::Client,
    base_url: &str,
    cookie_header: &str,
) -> Result<String, AppError> {
    let response = http
        .get(format!("{}/auth/token", base_url.trim_end_matches('/')))
        .header(COOKIE, cookie_header)
        .send()
        .await
        .map_err(|e| AppError::Internal(e.into()))?;

    if response.status().as_u16() == 401 {
        return Err(AppError::Unauthorized);
    }
    let body: TokenBody = response
        .error_for_status()
        .map_err(|e| AppError::Internal(e.into()))?
        .json()
        .await
        .map_err(|e| AppError::Internal(e.into()))?;
    Ok(body.access_token)
}

/// Reads activation from `GET /api/activation`.
#[derive(Clone)]
pub struct ActivationClient {
    http: reqwest::Client,
    activation_url: String,
    access_token: String,
}

impl ActivationClient {
    pub fn new(base_url: &str, access_token: String) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;
        Ok(Self {
            http,
            activation_url: format!("{}/api/activation", base_url.trim_end_matches('/')),
            access_token,
        })
    }
}

#[async_trait]
impl ActivationSource for ActivationClient {
    async fn fetch(&self, freshness: Freshness) -> Result<ActivationStatus, AppError> {
        let mut request = self
            .http
            .get(&self.activation_url)
            .bearer_auth(&self.access_token);
        if freshness == Freshness::Fresh {
            request = request.header(CACHE_CONTROL, "no-cache");
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Internal(e.into()))?;

        if response.status().as_u16() == 401 {
            return Err(AppError::Unauthorized);
        }

        response
            .error_for_status()
            .map_err(|e| AppError::Internal(e.into()))?
            .json()
            .await
            .map_err(|e| AppError::Internal(e.into()))
    }
}
