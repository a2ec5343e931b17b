// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client-side onboarding gate.
//!
//! Runs on every navigation inside the protected area and decides whether
//! the user stays, is sent to onboarding, or is sent away from it. Activation
//! can change mid-session, so an "incomplete" answer is always re-checked
//! against the source before redirecting.
//!
//! Each navigation takes a [`Ticket`] from the gate's [`Generation`]. A later
//! navigation or [`OnboardingGate::teardown`] invalidates older tickets, and
//! a check whose ticket is no longer current returns
//! [`GateDecision::Discarded`] instead of a redirect.

use crate::config::{
    Config, LANDING_ROUTE, ONBOARDING_ROUTE, ONBOARDING_SAFE_PREFIXES, PROTECTED_PREFIX,
};
use crate::error::AppError;
use crate::models::ActivationStatus;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// How much caching a fetch may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Any cache in front of the source is acceptable.
    Cached,
    /// Bypass caches; used by the re-check before redirecting.
    Fresh,
}

/// Where the gate gets activation from.
#[async_trait]
pub trait ActivationSource: Send + Sync {
    async fn fetch(&self, freshness: Freshness) -> Result<ActivationStatus, AppError>;
}

/// Routes and timing the gate enforces.
#[derive(Debug, Clone)]
pub struct GatePolicy {
    /// Disables the gate entirely (deterministic end-to-end runs).
    pub test_mode: bool,
    pub protected_prefix: String,
    pub onboarding_route: String,
    pub landing_route: String,
    /// Routes an unactivated user may stay on.
    pub safe_prefixes: Vec<String>,
    /// Cached activation older than this is revalidated before deciding.
    pub max_staleness: Duration,
}

impl GatePolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            test_mode: config.e2e_test_mode,
            protected_prefix: PROTECTED_PREFIX.to_string(),
            onboarding_route: ONBOARDING_ROUTE.to_string(),
            landing_route: LANDING_ROUTE.to_string(),
            safe_prefixes: ONBOARDING_SAFE_PREFIXES
                .iter()
                .map(|p| p.to_string())
                .collect(),
            max_staleness: config.activation_max_staleness,
        }
    }

    fn is_protected(&self, path: &str) -> bool {
        is_under(path, &self.protected_prefix)
    }

    fn is_onboarding(&self, path: &str) -> bool {
        is_under(path, &self.onboarding_route)
    }

    fn is_onboarding_safe(&self, path: &str) -> bool {
        self.safe_prefixes.iter().any(|prefix| is_under(path, prefix))
    }
}

/// Outcome of one navigation check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// No navigation.
    Stay,
    /// Navigate to the given route.
    Redirect(String),
    /// The check was superseded before it finished; do nothing.
    Discarded,
}

/// A fetched activation and when its fetch started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivationSnapshot {
    pub status: ActivationStatus,
    pub fetched_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationView {
    Loading,
    Ready(ActivationSnapshot),
}

/// Monotonic counter that invalidates in-flight checks.
#[derive(Debug, Default)]
pub struct Generation(AtomicU64);

/// Identity of one check; valid until the generation advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

impl Generation {
    /// Start a new generation, invalidating every earlier ticket.
    pub fn advance(&self) -> Ticket {
        Ticket(self.0.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.0.load(Ordering::SeqCst) == ticket.0
    }
}

/// Client-session cache of the activation state.
pub struct ActivationTracker<S> {
    source: S,
    view: RwLock<ActivationView>,
}

impl<S: ActivationSource> ActivationTracker<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            view: RwLock::new(ActivationView::Loading),
        }
    }

    pub async fn view(&self) -> ActivationView {
        *self.view.read().await
    }

    /// Fetch from the source and cache the result.
    ///
    /// A fetch that started before the cached one never overwrites it.
    pub async fn refresh(&self, freshness: Freshness) -> Result<ActivationStatus, AppError> {
        let started = Instant::now();
        let status = self.source.fetch(freshness).await?;

        let mut view = self.view.write().await;
        let newer = match *view {
            ActivationView::Loading => true,
            ActivationView::Ready(current) => started >= current.fetched_at,
        };
        if newer {
            *view = ActivationView::Ready(ActivationSnapshot {
                status,
                fetched_at: started,
            });
        }
        Ok(status)
    }
}

/// Navigation watcher enforcing "not activated means onboarding".
pub struct OnboardingGate<S> {
    policy: GatePolicy,
    tracker: ActivationTracker<S>,
    generation: Generation,
}

impl<S: ActivationSource> OnboardingGate<S> {
    pub fn new(policy: GatePolicy, source: S) -> Self {
        Self {
            policy,
            tracker: ActivationTracker::new(source),
            generation: Generation::default(),
        }
    }

    pub fn tracker(&self) -> &ActivationTracker<S> {
        &self.tracker
    }

    /// Initial activation load; the gate takes no action until it completes.
    pub async fn load(&self) -> Result<ActivationStatus, AppError> {
        self.tracker.refresh(Freshness::Cached).await
    }

    /// Invalidate any in-flight check (the watcher is going away).
    pub fn teardown(&self) {
        self.generation.advance();
    }

    /// Decide what to do after navigating to `route`.
    ///
    /// Supersedes every check still running for an earlier navigation.
    pub async fn on_navigate(&self, route: &str) -> GateDecision {
        let ticket = self.generation.advance();

        if self.policy.test_mode {
            return GateDecision::Stay;
        }
        let path = route_path(route);
        if !self.policy.is_protected(path) {
            return GateDecision::Stay;
        }

        let snapshot = match self.tracker.view().await {
            ActivationView::Loading => return GateDecision::Stay,
            ActivationView::Ready(snapshot) => snapshot,
        };

        let mut status = snapshot.status;
        // Set once a forced fetch has been attempted for this navigation
        let mut fresh = false;
        if snapshot.fetched_at.elapsed() > self.policy.max_staleness {
            fresh = true;
            match self.tracker.refresh(Freshness::Fresh).await {
                Ok(revalidated) => status = revalidated,
                Err(e) => {
                    tracing::warn!(error = %e, "Activation revalidation failed, using cached state")
                }
            }
            if !self.generation.is_current(ticket) {
                return self.discard(route);
            }
        }

        if status.is_activated() {
            if self.policy.is_onboarding(path) {
                tracing::info!(route, "Activated user on onboarding, redirecting to landing");
                return GateDecision::Redirect(self.policy.landing_route.clone());
            }
            return GateDecision::Stay;
        }

        if self.policy.is_onboarding_safe(path) {
            return GateDecision::Stay;
        }

        if !fresh {
            match self.tracker.refresh(Freshness::Fresh).await {
                Ok(rechecked) => status = rechecked,
                Err(e) => {
                    tracing::warn!(error = %e, route, "Activation re-check failed, treating as incomplete")
                }
            }
            if !self.generation.is_current(ticket) {
                return self.discard(route);
            }
        }

        if status.is_activated() {
            tracing::debug!(route, "Re-check found activation complete");
            GateDecision::Stay
        } else {
            tracing::info!(route, "Activation incomplete, redirecting to onboarding");
            GateDecision::Redirect(self.policy.onboarding_route.clone())
        }
    }

    fn discard(&self, route: &str) -> GateDecision {
        tracing::debug!(route, "Navigation superseded, discarding gate decision");
        GateDecision::Discarded
    }
}

/// Path component of a route (query and fragment stripped).
fn route_path(route: &str) -> &str {
    route.split(['?', '#']).next().unwrap_or(route)
}

/// Segment-aware prefix match: `/app/log` covers `/app/log/x` but not `/app/logout`.
fn is_under(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
