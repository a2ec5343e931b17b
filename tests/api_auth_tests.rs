// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API authentication, activation and CORS tests.
//!
//! These tests verify that:
//! 1. Protected routes reject requests without a token the provider accepts
//! 2. Bearer and cookie sessions are both accepted
//! 3. Activation reflects the store on every request
//! 4. CORS preflight requests return correct headers

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;

mod common;

use common::{
    body_json, complete_profile, create_test_app, create_unconfigured_app, session_cookie,
    test_session, test_user, FakeIdentity, MemoryStore, UserRows, FAR_FUTURE,
};

fn bearer(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_protected_route_without_token() {
    let (app, _) = create_test_app(FakeIdentity::default(), MemoryStore::default());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/activation")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_with_unknown_token() {
    let (app, _) = create_test_app(FakeIdentity::default(), MemoryStore::default());

    let response = app.oneshot(bearer("/api/me", "forged")).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_non_bearer_authorization_is_rejected() {
    let identity = FakeIdentity::default().with_user("access-1", test_user("user-1"));
    let (app, _) = create_test_app(identity, MemoryStore::default());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/me")
                .header(header::AUTHORIZATION, "Basic access-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_with_bearer_token() {
    let identity = FakeIdentity::default().with_user("access-1", test_user("user-1"));
    let (app, _) = create_test_app(identity, MemoryStore::default());

    let response = app.oneshot(bearer("/api/me", "access-1")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({ "id": "user-1", "email": "user-1@example.com" })
    );
}

#[tokio::test]
async fn test_activation_with_session_cookie() {
    let session = test_session("user-1", "access-1", FAR_FUTURE);
    let identity = FakeIdentity::default().with_user("access-1", test_user("user-1"));
    let store = MemoryStore::default().with_user("user-1", UserRows::activated());
    let (app, _) = create_test_app(identity, store);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/activation")
                .header(header::COOKIE, session_cookie(&session))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "no-store"
    );
    assert_eq!(
        body_json(response).await,
        serde_json::json!({
            "activated": true,
            "profile_complete": true,
            "has_any_log": true,
            "has_any_report": true,
        })
    );
}

#[tokio::test]
async fn test_activation_incomplete_profile() {
    let mut profile = complete_profile();
    profile.work_mode = Some("unknown".to_string());
    let identity = FakeIdentity::default().with_user("access-1", test_user("user-1"));
    let store = MemoryStore::default().with_user(
        "user-1",
        UserRows {
            profile: Some(profile),
            logs: 1,
            reports: 1,
        },
    );
    let (app, _) = create_test_app(identity, store);

    let body = body_json(app.oneshot(bearer("/api/activation", "access-1")).await.unwrap()).await;

    assert_eq!(body["activated"], false);
    assert_eq!(body["profile_complete"], false);
    assert_eq!(body["has_any_log"], true);
}

#[tokio::test]
async fn test_activation_with_unavailable_source_is_incomplete() {
    let identity = FakeIdentity::default().with_user("access-1", test_user("user-1"));
    let store = MemoryStore {
        reports_unavailable: true,
        ..Default::default()
    }
    .with_user("user-1", UserRows::activated());
    let (app, _) = create_test_app(identity, store);

    let response = app.oneshot(bearer("/api/activation", "access-1")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["activated"], false);
    assert_eq!(body["has_any_report"], false);
    assert_eq!(body["profile_complete"], true);
}

#[tokio::test]
async fn test_activation_is_derived_per_request() {
    let identity = FakeIdentity::default().with_user("access-1", test_user("user-1"));
    let store = std::sync::Arc::new(MemoryStore::default().with_user(
        "user-1",
        UserRows {
            profile: Some(complete_profile()),
            logs: 1,
            reports: 0,
        },
    ));
    let state = std::sync::Arc::new(routineiq_gateway::AppState {
        config: routineiq_gateway::config::Config::test_default(),
        backend: Some(routineiq_gateway::Backend {
            identity: std::sync::Arc::new(identity),
            evaluator: routineiq_gateway::services::ActivationEvaluator::new(store.clone()),
        }),
    });
    let app = routineiq_gateway::routes::create_router(state);

    let before = body_json(
        app.clone()
            .oneshot(bearer("/api/activation", "access-1"))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(before["activated"], false);

    // First report generated mid-session
    store
        .rows
        .lock()
        .unwrap()
        .get_mut("user-1")
        .unwrap()
        .reports = 1;

    let after = body_json(app.oneshot(bearer("/api/activation", "access-1")).await.unwrap()).await;
    assert_eq!(after["activated"], true);
}

#[tokio::test]
async fn test_protected_route_without_backend() {
    let app = create_unconfigured_app();

    let response = app.oneshot(bearer("/api/me", "access-1")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_health_is_public() {
    let app = create_unconfigured_app();

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn test_cors_preflight() {
    let (app, _) = create_test_app(FakeIdentity::default(), MemoryStore::default());

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/auth/token")
                .header(header::ORIGIN, "http://localhost:3000")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "http://localhost:3000"
    );
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .unwrap(),
        "true"
    );
}

#[tokio::test]
async fn test_cors_rejects_unknown_origin() {
    let (app, _) = create_test_app(FakeIdentity::default(), MemoryStore::default());

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/auth/token")
                .header(header::ORIGIN, "https://evil.example")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[tokio::test]
async fn test_cors_rejects_localhost_lookalike_origin() {
    let (app, _) = create_test_app(FakeIdentity::default(), MemoryStore::default());

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/auth/token")
                .header(header::ORIGIN, "http://localhost.attacker.example")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}
