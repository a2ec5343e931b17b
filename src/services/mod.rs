// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod activation;
pub mod cookies;
pub mod gate;
pub mod identity;
pub mod intent;
pub mod pkce;
pub mod redirect;
pub mod session;
pub mod supabase;

pub use activation::ActivationEvaluator;
pub use cookies::CookiePolicy;
pub use gate::{ActivationSource, GateDecision, GatePolicy, OnboardingGate};
pub use identity::{IdentityError, IdentityProvider};
pub use intent::RedirectIntent;
pub use redirect::{sanitize_next, sanitize_next_or};
pub use supabase::SupabaseAuth;
