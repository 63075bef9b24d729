//! Operator-facing HTTP API.
//!
//! Exposes the recommendation send endpoint, a template smoke test, and a
//! health check. Every request is traced; CORS is permissive.

mod error;
mod handlers;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::client::WhatsAppClient;
use crate::config::Config;

pub use error::ApiError;
pub use handlers::{MessageReport, SendRecommendationsRequest, SendReport, TestWhatsAppRequest};

/// Shared state accessible by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub client: WhatsAppClient,
}

impl AppState {
    pub fn new(config: Config, client: WhatsAppClient) -> Self {
        Self {
            config: Arc::new(config),
            client,
        }
    }
}

/// Build the router with all routes.
pub fn build_router(state: AppState) -> Router {
    handlers::routes()
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
