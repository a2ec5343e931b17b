// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activation;
pub mod profile;
pub mod session;
pub mod user;

pub use activation::{ActivationStatus, SourceResult};
pub use profile::ProfileFields;
pub use session::AuthSession;
pub use user::User;
