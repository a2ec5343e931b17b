// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! PKCE (RFC 7636) verifier/challenge generation for the OAuth code flow.

use crate::error::AppError;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use ring::rand::{SecureRandom, SystemRandom};
use sha2::{Digest, Sha256};

/// Cookie holding the verifier between `/auth/login` and `/auth/callback`.
pub const PKCE_VERIFIER_COOKIE: &str = "routineiq_pkce_verifier";

/// Verifier kept by us, challenge sent to the provider.
#[derive(Debug, Clone)]
pub struct PkcePair {
    pub verifier: String,
    pub challenge: String,
}

impl PkcePair {
    pub fn generate() -> Result<Self, AppError> {
        let mut bytes = [0u8; 32];
        SystemRandom::new()
            .fill(&mut bytes)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("System RNG unavailable")))?;
        let verifier = URL_SAFE_NO_PAD.encode(bytes);
        let challenge = challenge_for(&verifier);
        Ok(Self {
            verifier,
            challenge,
        })
    }
}

/// S256 challenge: base64url(sha256(verifier)).
pub fn challenge_for(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}
