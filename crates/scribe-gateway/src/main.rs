//! Scribe Gateway: HTTP front for the AI writing assistant.
//! `/health`, `/api/chat` (agent turn), `/api/test` (echo). Stateless between requests;
//! the client resends the whole project every turn.

mod handlers;

use std::any::Any;
use std::sync::Arc;

use axum::{
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use scribe_core::{ScribeConfig, WritingAgent};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as CorsAny, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use handlers::chat::{chat, test_echo};
use handlers::health::health;

/// Shared per-process state. `agent` is `None` when startup could not configure the model.
#[derive(Clone)]
pub struct AppState {
    pub agent: Option<Arc<WritingAgent>>,
}

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[scribe-gateway] .env not loaded: {} (using system environment)", e);
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match ScribeConfig::load() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("[SCRIBE] Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let api_key = ScribeConfig::api_key_from_env();
    let agent = match WritingAgent::from_config(&config, api_key.as_deref()) {
        Ok(agent) => {
            tracing::info!(
                model = %agent.model_name(),
                mode = ?config.llm_mode,
                "[SCRIBE] Writing agent initialized successfully"
            );
            Some(Arc::new(agent))
        }
        Err(e) => {
            tracing::error!("[SCRIBE] Failed to initialize writing agent: {}", e);
            None
        }
    };

    let app = build_app(AppState { agent });

    let addr = config.bind_addr();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("[SCRIBE] Cannot bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    tracing::info!("[SCRIBE] Gateway listening on {}", addr);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("[SCRIBE] Server error: {}", e);
        std::process::exit(1);
    }
}

fn build_app(state: AppState) -> Router {
    // Browser clients on any origin may call /api/*; /health stays outside the CORS policy.
    let cors = CorsLayer::new()
        .allow_origin(CorsAny)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(CorsAny);

    let api = Router::new()
        .route("/api/chat", post(chat))
        .route("/api/test", post(test_echo))
        .layer(cors);

    Router::new()
        .route("/health", get(health))
        .merge(api)
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
}

/// Unhandled failures inside a handler become `500 {"error": "Internal server error: ..."}`.
fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown error".to_string()
    };
    tracing::error!("[SCRIBE] Handler panicked: {}", detail);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": format!("Internal server error: {}", detail) })),
    )
        .into_response()
}
