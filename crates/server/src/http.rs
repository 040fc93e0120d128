//! HTTP Endpoints
//!
//! REST API for the concierge widget.

use std::time::Instant;

use axum::{
    extract::{Json, Path, State},
    http::{HeaderValue, Method},
    middleware,
    response::IntoResponse,
    routing::{delete, get, post},
    Extension, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use concierge_core::{Intent, IntentPayload, MessageBody, RawFilters, WidgetMessage};
use concierge_engine::{copy, decide_intent, TurnRequest};

use crate::auth::auth_middleware;
use crate::metrics::{metrics_handler, record_intent, record_turn};
use crate::state::AppState;
use crate::ServerError;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let cors_layer = build_cors_layer(
        &state.config.server.cors_origins,
        state.config.server.cors_enabled,
    );
    let settings = state.config.clone();

    Router::new()
        // Session endpoints
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session))
        .route("/api/sessions/:id", delete(delete_session))
        .route("/api/sessions", get(list_sessions))
        // Free-text chat turn
        .route("/api/chat/:session_id", post(chat))
        // Structured widget intent (form submissions, quick actions)
        .route("/api/intents/:session_id", post(submit_intent))
        // Health checks
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        // Prometheus metrics endpoint
        .route("/metrics", get(metrics_handler))
        // Middleware
        .layer(middleware::from_fn(auth_middleware))
        .layer(Extension(settings.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(std::time::Duration::from_secs(
            settings.server.timeout_seconds,
        )))
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configured origins
///
/// - If cors_enabled is false, returns a permissive layer (for dev)
/// - If cors_origins is empty, defaults to localhost:3000 for safety
/// - Otherwise, uses the configured origins
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins (NOT FOR PRODUCTION)");
        return CorsLayer::permissive();
    }

    if origins.is_empty() {
        tracing::info!("No CORS origins configured, defaulting to localhost:3000");
        return localhost_cors();
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    if parsed_origins.is_empty() {
        tracing::error!("All configured CORS origins are invalid, falling back to localhost");
        return localhost_cors();
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    CorsLayer::new()
        .allow_origin(parsed_origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
        .allow_credentials(true)
}

fn localhost_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin("http://localhost:3000".parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct CreateSessionRequest {
    /// Email verified by the storefront, used for order ownership
    email: Option<String>,
}

/// Create a new widget session
async fn create_session(
    State(state): State<AppState>,
    body: Option<Json<CreateSessionRequest>>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let Json(request) = body.unwrap_or_default();
    let session = state.sessions.create(request.email)?;

    let greeting = WidgetMessage::concierge(
        MessageBody::AssistantText {
            text: copy::GREETING_PROMPT.to_string(),
        },
        None,
    );

    Ok(Json(serde_json::json!({
        "sessionId": session.id,
        "messages": [greeting],
    })))
}

/// Get session info
async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let session = state
        .sessions
        .get(&id)
        .ok_or_else(|| ServerError::Session(format!("unknown session {id}")))?;

    let snapshot = session.snapshot();
    Ok(Json(serde_json::json!({
        "sessionId": session.id,
        "lastIntent": snapshot.last_intent,
        "hasShownCsat": snapshot.has_shown_csat,
        "shortlistCount": snapshot.shortlist.len(),
    })))
}

/// Delete session
async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> axum::http::StatusCode {
    state.sessions.remove(&id);
    axum::http::StatusCode::NO_CONTENT
}

/// List sessions
async fn list_sessions(State(state): State<AppState>) -> Json<serde_json::Value> {
    let sessions = state.sessions.list();
    Json(serde_json::json!({
        "sessions": sessions,
        "count": sessions.len(),
    }))
}

/// Chat request
#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: String,
}

/// Turn response shared by the chat and intent endpoints
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TurnResponse {
    intent: &'static str,
    confidence: f32,
    reason: &'static str,
    messages: Vec<WidgetMessage>,
}

/// Free-text chat turn: classify, then execute.
async fn chat(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<TurnResponse>, ServerError> {
    let session = state
        .sessions
        .get(&session_id)
        .ok_or_else(|| ServerError::Session(format!("unknown session {session_id}")))?;
    state.check_rate_limit(&session_id)?;
    session.touch();

    let snapshot = session.snapshot();
    let context = snapshot.context();
    let decision = decide_intent(&request.message, Some(&context));
    record_intent(decision.intent.as_str(), decision.reason);

    tracing::debug!(
        session = %session_id,
        intent = %decision.intent,
        reason = decision.reason,
        confidence = decision.confidence,
        "classified chat turn"
    );

    // Extracted filters ride along as a structured submission.
    let payload = match &decision.filters {
        Some(filters) if decision.intent == Intent::FindProduct => {
            IntentPayload::SubmitProductFilters {
                filters: RawFilters::from(filters.clone()),
            }
        }
        _ => IntentPayload::None,
    };

    let executor = state.executor_for(&session);
    let started = Instant::now();
    let result = executor
        .execute(TurnRequest {
            intent: decision.intent,
            payload,
            state: snapshot,
        })
        .await;
    record_turn("chat", started.elapsed(), result.is_ok());

    let outcome = result.map_err(ServerError::from)?;
    session.replace_state(outcome.state);

    Ok(Json(TurnResponse {
        intent: decision.intent.as_str(),
        confidence: decision.confidence,
        reason: decision.reason,
        messages: outcome.messages,
    }))
}

/// Structured widget intent: form submissions and quick actions.
///
/// The body is `{ "intent": ..., "action": ..., ...payload fields }`; an
/// unknown intent name is logged and handled as a clarify turn rather than
/// failing the request.
async fn submit_intent(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<TurnResponse>, ServerError> {
    let session = state
        .sessions
        .get(&session_id)
        .ok_or_else(|| ServerError::Session(format!("unknown session {session_id}")))?;
    state.check_rate_limit(&session_id)?;
    session.touch();

    let intent_name = body
        .get("intent")
        .and_then(|v| v.as_str())
        .ok_or_else(|| ServerError::InvalidRequest("missing intent field".to_string()))?;

    let intent = Intent::parse_widget(intent_name).unwrap_or_else(|| {
        tracing::warn!(session = %session_id, intent = intent_name, "unknown widget intent");
        Intent::Clarify
    });
    record_intent(intent.as_str(), "widget_intent");

    let payload: IntentPayload = if body.get("action").is_some() {
        serde_json::from_value(body.clone())
            .map_err(|e| ServerError::InvalidRequest(e.to_string()))?
    } else {
        IntentPayload::None
    };

    let executor = state.executor_for(&session);
    let started = Instant::now();
    let result = executor
        .execute(TurnRequest {
            intent,
            payload,
            state: session.snapshot(),
        })
        .await;
    record_turn("intents", started.elapsed(), result.is_ok());

    let outcome = result.map_err(ServerError::from)?;
    session.replace_state(outcome.state);

    Ok(Json(TurnResponse {
        intent: intent.as_str(),
        confidence: 1.0,
        reason: "widget_intent",
        messages: outcome.messages,
    }))
}

/// Health check
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Readiness check
async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ready",
        "sessions": state.sessions.count(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use concierge_config::Settings;
    use concierge_core::{
        EngineError, OrderDesk, OrderLookup, OrderTimeline, Product, ProductCatalog, ProductQuery,
        Result as EngineResult, ReturnReceipt, ReturnRequest, ReturnsDesk, StylistDesk,
        StylistReceipt, StylistRequest,
    };

    struct EmptyCatalog;

    #[async_trait]
    impl ProductCatalog for EmptyCatalog {
        async fn search(&self, _query: &ProductQuery) -> EngineResult<Vec<Product>> {
            Ok(vec![])
        }
    }

    struct NoOrders;

    #[async_trait]
    impl OrderDesk for NoOrders {
        async fn status(&self, _lookup: &OrderLookup) -> EngineResult<OrderTimeline> {
            Err(EngineError::OrderNotFound)
        }
    }

    struct StubReturns;

    #[async_trait]
    impl ReturnsDesk for StubReturns {
        async fn open_return(&self, _request: &ReturnRequest) -> EngineResult<ReturnReceipt> {
            Ok(ReturnReceipt {
                message: "done".to_string(),
            })
        }
    }

    struct StubStylists;

    #[async_trait]
    impl StylistDesk for StubStylists {
        async fn request_contact(
            &self,
            _request: &StylistRequest,
        ) -> EngineResult<StylistReceipt> {
            Ok(StylistReceipt {
                message: "done".to_string(),
            })
        }
    }

    fn test_state() -> AppState {
        AppState::with_collaborators(
            Settings::default(),
            Arc::new(EmptyCatalog),
            Arc::new(NoOrders),
            Arc::new(StubReturns),
            Arc::new(StubStylists),
        )
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_router_creation() {
        let _ = create_router(test_state());
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_router(test_state());
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "healthy");
    }

    #[tokio::test]
    async fn test_chat_turn_against_unknown_session() {
        let app = create_router(test_state());
        let response = app
            .oneshot(
                Request::post("/api/chat/nope")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"message":"hello"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_session_then_chat_flow() {
        let state = test_state();
        let app = create_router(state.clone());

        let response = app
            .clone()
            .oneshot(
                Request::post("/api/sessions")
                    .header("content-type", "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let session_id = body_json(response).await["sessionId"]
            .as_str()
            .unwrap()
            .to_string();

        let response = app
            .oneshot(
                Request::post(format!("/api/chat/{session_id}"))
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"message":"where is my order?"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["intent"], "track_order");
        let modules: Vec<&str> = json["messages"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|m| m["payload"]["module"].as_str())
            .collect();
        assert!(modules.contains(&"order-lookup"));
    }

    #[tokio::test]
    async fn test_widget_intent_with_payload() {
        let state = test_state();
        let session = state.sessions.create(None).unwrap();
        let app = create_router(state);

        let body = serde_json::json!({
            "intent": "track_order",
            "action": "submit-order-lookup",
            "orderId": "GG-123456",
        });
        let response = app
            .oneshot(
                Request::post(format!("/api/intents/{}", session.id))
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        // NoOrders reports a miss; the turn still succeeds with copy.
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["messages"][0]["type"], "assistant_text");
    }

    #[tokio::test]
    async fn test_unknown_widget_intent_falls_back_to_clarify() {
        let state = test_state();
        let session = state.sessions.create(None).unwrap();
        let app = create_router(state);

        let response = app
            .oneshot(
                Request::post(format!("/api/intents/{}", session.id))
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"intent":"give_discount"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["intent"], "clarify");
    }
}
