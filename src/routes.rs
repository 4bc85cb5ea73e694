//! Route definitions and router setup
//!
//! Configures all API routes and middleware.

mod voting;

use crate::auth::caller_middleware;
use crate::config::Settings;
use crate::state::SharedState;
use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::MakeRequestUuid,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
    ServiceBuilderExt,
};
use tracing::Level;

/// Create the application router with all routes and middleware
pub fn create_router(state: SharedState, settings: &Settings) -> Router {
    // Build CORS layer
    let cors = build_cors_layer(settings);

    // Build tracing/logging layer
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    // Build middleware stack
    let middleware = ServiceBuilder::new()
        .set_x_request_id(MakeRequestUuid)
        .layer(trace_layer)
        .layer(CompressionLayer::new())
        .layer(cors)
        .propagate_x_request_id();

    // Routes that act on behalf of a caller
    let caller_routes = Router::new()
        .route("/api/me", get(voting::whoami))
        .route("/api/workflow/{transition}", post(voting::advance_workflow))
        .route("/api/voters", post(voting::register_voter))
        .route("/api/voters/{identity}", get(voting::get_voter))
        .route(
            "/api/proposals",
            post(voting::submit_proposal).get(voting::list_proposals),
        )
        .route("/api/proposals/{id}", get(voting::get_proposal))
        .route("/api/votes", post(voting::cast_vote))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            caller_middleware,
        ));

    // Build the router
    Router::new()
        // Health check
        .route("/health", get(health_check))

        // Public session state
        .route("/api/workflow", get(voting::get_status))
        .route("/api/events", get(voting::list_events))

        .merge(caller_routes)

        // Apply middleware and state
        .layer(middleware)
        .with_state(state)
}

/// Build CORS layer from settings
fn build_cors_layer(settings: &Settings) -> CorsLayer {
    let origins: Vec<_> = settings
        .cors
        .allowed_origins
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect();

    if origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
            .max_age(Duration::from_secs(3600))
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
            .max_age(Duration::from_secs(3600))
    }
}

/// Health check endpoint
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "success": true,
        "message": "Server is running fine.",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Claims, TokenKeys};
    use crate::state::AppState;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    const ADMIN: &str = "0xA";
    const SECRET: &str = "router-test-secret";

    fn app() -> Router {
        let mut settings = Settings::default();
        settings.voting.administrator = ADMIN.to_string();
        settings.auth.jwt_secret = SECRET.to_string();
        let state = Arc::new(AppState::new(&settings));
        create_router(state, &settings)
    }

    fn bearer(identity: &str) -> String {
        let token = TokenKeys::new(SECRET, 15)
            .issue(&crate::voting::Identity::new(identity))
            .unwrap();
        format!("Bearer {token}")
    }

    async fn call(
        app: &Router,
        method: Method,
        uri: &str,
        caller: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        call_with(app, method, uri, caller.map(bearer), body).await
    }

    async fn call_with(
        app: &Router,
        method: Method,
        uri: &str,
        authorization: Option<String>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(authorization) = authorization {
            builder = builder.header(header::AUTHORIZATION, authorization);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn transition(app: &Router, name: &str) -> (StatusCode, Value) {
        call(app, Method::POST, &format!("/api/workflow/{name}"), Some(ADMIN), None).await
    }

    #[tokio::test]
    async fn test_full_session_over_http() {
        let app = app();

        let (status, _) = call(&app, Method::POST, "/api/voters", Some(ADMIN), Some(json!({ "identity": ADMIN }))).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, _) = call(&app, Method::POST, "/api/voters", Some(ADMIN), Some(json!({ "identity": "0xB" }))).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = transition(&app, "start-proposals-registering").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["phaseIndex"], 1);

        let (status, body) = call(&app, Method::POST, "/api/proposals", Some("0xB"), Some(json!({ "description": "X" }))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["proposalId"], 0);

        transition(&app, "end-proposals-registering").await;
        transition(&app, "start-voting-session").await;

        let (status, _) = call(&app, Method::POST, "/api/votes", Some("0xB"), Some(json!({ "proposalId": 0 }))).await;
        assert_eq!(status, StatusCode::OK);

        transition(&app, "end-voting-session").await;
        let (status, body) = transition(&app, "tally-votes").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["phase"], "VotesTallied");

        let (_, body) = call(&app, Method::GET, "/api/workflow", None, None).await;
        assert_eq!(body["status"]["winningProposalId"], 0);
        assert_eq!(body["status"]["phaseIndex"], 5);

        let (_, body) = call(&app, Method::GET, "/api/events?since=0", None, None).await;
        let voted: Vec<&Value> = body["events"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|e| e["event"] == "Voted")
            .collect();
        assert_eq!(voted.len(), 1);
        assert_eq!(voted[0]["voter"], "0xB");
        assert_eq!(voted[0]["proposalId"], 0);
    }

    #[tokio::test]
    async fn test_missing_caller_is_rejected() {
        let app = app();
        let (status, body) = call(&app, Method::POST, "/api/voters", None, Some(json!({ "identity": "0xB" }))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "UNAUTHENTICATED");
        assert_eq!(body["message"], "Missing authorization header");
    }

    #[tokio::test]
    async fn test_unverified_tokens_cannot_act_as_administrator() {
        let app = app();
        let register = || Some(json!({ "identity": "0xB" }));

        let forged = TokenKeys::new("some-other-secret", 15)
            .issue(&crate::voting::Identity::new(ADMIN))
            .unwrap();
        let now = chrono::Utc::now().timestamp();
        let expired = TokenKeys::new(SECRET, 15)
            .sign(&Claims {
                sub: ADMIN.to_string(),
                exp: now - 3600,
                iat: now - 7200,
            })
            .unwrap();

        let attempts = [
            (Some(format!("Bearer {forged}")), "Invalid token signature"),
            (Some(format!("Bearer {expired}")), "Token expired"),
            (Some(ADMIN.to_string()), "Invalid authorization format"),
            (Some("Bearer not-a-token".to_string()), ""),
        ];
        for (authorization, message) in attempts {
            let (status, body) = call_with(&app, Method::POST, "/api/voters", authorization.clone(), register()).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body["code"], "UNAUTHENTICATED");
            if !message.is_empty() {
                assert_eq!(body["message"], message);
            }

            let (status, _) = call_with(&app, Method::POST, "/api/workflow/start-proposals-registering", authorization, None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
        }

        // A bare identity header is not a credential
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/workflow/start-proposals-registering")
            .header("x-caller-identity", ADMIN)
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let (_, body) = call(&app, Method::GET, "/api/workflow", None, None).await;
        assert_eq!(body["status"]["phase"], "RegisteringVoters");
        assert_eq!(body["status"]["voterCount"], 0);
    }

    #[tokio::test]
    async fn test_malformed_body_uses_error_envelope() {
        let app = app();
        call(&app, Method::POST, "/api/voters", Some(ADMIN), Some(json!({ "identity": "0xB" }))).await;
        for name in ["start-proposals-registering", "end-proposals-registering", "start-voting-session"] {
            transition(&app, name).await;
        }

        let (status, body) = call(&app, Method::POST, "/api/votes", Some("0xB"), Some(json!({ "proposalId": -1 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let (status, body) = call(&app, Method::POST, "/api/voters", Some(ADMIN), Some(json!({ "who": 1 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_engine_errors_map_to_status_codes() {
        let app = app();

        let (status, body) = call(&app, Method::POST, "/api/voters", Some("0xB"), Some(json!({ "identity": "0xC" }))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Unauthorized: caller is not the administrator");

        call(&app, Method::POST, "/api/voters", Some(ADMIN), Some(json!({ "identity": "0xB" }))).await;
        let (status, body) = call(&app, Method::POST, "/api/voters", Some(ADMIN), Some(json!({ "identity": "0xB" }))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "ALREADY_REGISTERED");

        let (status, body) = call(&app, Method::POST, "/api/proposals", Some("0xB"), Some(json!({ "description": "early" }))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "INVALID_PHASE");

        transition(&app, "start-proposals-registering").await;
        let (status, body) = call(&app, Method::POST, "/api/proposals", Some("0xB"), Some(json!({ "description": "" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Proposal description cannot be empty");

        let (status, body) = call(&app, Method::GET, "/api/proposals/9", Some("0xB"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Proposal 9 not found");
    }

    #[tokio::test]
    async fn test_invalid_registration_payload() {
        let app = app();
        let (status, body) = call(&app, Method::POST, "/api/voters", Some(ADMIN), Some(json!({ "identity": "bad identity" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_whoami_and_unknown_voter() {
        let app = app();
        call(&app, Method::POST, "/api/voters", Some(ADMIN), Some(json!({ "identity": "0xB" }))).await;

        let (_, body) = call(&app, Method::GET, "/api/me", Some(ADMIN), None).await;
        assert_eq!(body["role"], "administrator");
        let (_, body) = call(&app, Method::GET, "/api/me", Some("0xB"), None).await;
        assert_eq!(body["role"], "voter");

        let (status, body) = call(&app, Method::GET, "/api/voters/0xNobody", Some("0xB"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["voter"]["isRegistered"], false);
        assert_eq!(body["voter"]["hasVoted"], false);
    }
}
