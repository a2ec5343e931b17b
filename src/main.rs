// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! RoutineIQ auth gateway server
//!
//! Completes OAuth sign-ins, bridges the session cookie to bearer consumers,
//! and serves the activation state the onboarding gate enforces.

use routineiq_gateway::{
    config::Config,
    db::PostgrestStore,
    services::{ActivationEvaluator, SupabaseAuth},
    AppState, Backend,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        site_url = %config.site_url,
        e2e_test_mode = config.e2e_test_mode,
        "Starting RoutineIQ auth gateway"
    );

    // Identity provider and data store share the Supabase project
    let backend = match &config.supabase {
        Some(supabase) => {
            let identity = SupabaseAuth::new(supabase)?;
            let store = PostgrestStore::new(supabase)?;
            tracing::info!(url = %supabase.url, "Supabase backend configured");
            Some(Backend {
                identity: Arc::new(identity),
                evaluator: ActivationEvaluator::new(Arc::new(store)),
            })
        }
        None => {
            tracing::warn!("SUPABASE_URL/SUPABASE_ANON_KEY not set, auth routes will redirect to login");
            None
        }
    };

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        backend,
    });

    // Build router
    let app = routineiq_gateway::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("routineiq_gateway=debug,info"));

    tracing_subscriber::registry().with(filter).with(format).init();
}
