//! API module
//!
//! HTTP API endpoints and middleware.

pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::{middleware as axum_middleware, routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::domain::AmountNormalizer;
use crate::repository::{ApiKeyStore, ExpenseStore, MemoryStore, PgStore};

pub use routes::create_router;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub expenses: Arc<dyn ExpenseStore>,
    pub api_keys: Arc<dyn ApiKeyStore>,
    pub normalizer: AmountNormalizer,
}

impl AppState {
    pub fn new(expenses: Arc<dyn ExpenseStore>, api_keys: Arc<dyn ApiKeyStore>) -> Self {
        Self {
            expenses,
            api_keys,
            normalizer: AmountNormalizer::brl(),
        }
    }

    pub fn postgres(store: PgStore) -> Self {
        let store = Arc::new(store);
        Self::new(store.clone(), store)
    }

    pub fn memory(store: MemoryStore) -> Self {
        let store = Arc::new(store);
        Self::new(store.clone(), store)
    }
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    // Axum layers run in reverse order of addition: logging -> auth -> handler
    let protected_routes = create_router()
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ))
        .layer(axum_middleware::from_fn(middleware::logging_middleware));

    Router::new()
        // Health check (no auth)
        .route("/health", get(health_check))
        .nest("/api", protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
