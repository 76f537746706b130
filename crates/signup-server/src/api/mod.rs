//! HTTP API for the sign-up server.

mod handlers;
mod middleware;
mod types;

pub use handlers::*;
pub use middleware::{access_log, throttle_signups, SignupThrottle, THROTTLED_MESSAGE};
pub use types::*;

use crate::service::RegistrationService;
use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use member_store::MemberStore;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Registration workflow over the member store
    pub service: RegistrationService,
}

impl AppState {
    /// Create new application state.
    pub fn new(store: Arc<dyn MemberStore>) -> Self {
        Self {
            service: RegistrationService::new(store),
        }
    }
}

/// Create the API router.
///
/// Only `/v1/signup` draws on the throttle; `/health` is always answered.
pub fn create_router(state: AppState, throttle: SignupThrottle) -> Router {
    let signup = post(handlers::signup).route_layer(axum_middleware::from_fn_with_state(
        throttle,
        throttle_signups,
    ));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/v1/signup", signup)
        .layer(axum_middleware::from_fn(access_log))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
