use axum::{
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::TokenCodec;
use crate::config::{AppConfig, SecurityConfig};
use crate::database::Store;
use crate::handlers::{protected, public};
use crate::middleware::user_check;
use crate::services::{LlmClient, MessageQueue};

/// Fixed parameters of the chat pipeline
#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub system_prompt: String,
    pub max_tokens: u32,
    pub queue_url: String,
}

impl ChatSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            system_prompt: config.llm.system_prompt.clone(),
            max_tokens: config.llm.max_tokens,
            queue_url: config.queue.url.clone(),
        }
    }
}

/// Service handles shared by every request. Built once in `main`, cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub llm: Arc<dyn LlmClient>,
    pub queue: Arc<dyn MessageQueue>,
    pub tokens: Arc<TokenCodec>,
    pub chat: Arc<ChatSettings>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        llm: Arc<dyn LlmClient>,
        queue: Arc<dyn MessageQueue>,
        tokens: TokenCodec,
        chat: ChatSettings,
    ) -> Self {
        Self {
            store,
            llm,
            queue,
            tokens: Arc::new(tokens),
            chat: Arc::new(chat),
        }
    }
}

/// Full application router without CORS or tracing layers
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(public_routes())
        .merge(user_routes(state.clone()))
        .with_state(state)
}

/// Router with the global middleware the server runs with
pub fn app(state: AppState, security: &SecurityConfig) -> Router {
    router(state)
        .layer(cors_layer(security))
        .layer(TraceLayer::new_for_http())
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(public::health_get))
        .route("/login", post(public::login_post))
        .route("/pricing", get(public::pricing_get))
}

/// Everything here sits behind the user-only gate as one group
fn user_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/profile", get(protected::profile_get))
        .route("/chat", post(protected::chat_post))
        .route_layer(middleware::from_fn_with_state(state, user_check))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        // No allowed origins: browsers block cross-origin calls
        return CorsLayer::new();
    }
    if security.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}
