//! Router assembly.

use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::auth::require_bearer_jwt;
use crate::api::{handlers, ApiState};

/// Build the full application router. Secret routes require a bearer JWT;
/// liveness, healthcheck and metrics stay open.
pub fn build_router(state: ApiState) -> Router {
    let secret_api = Router::new()
        .route("/api/v1/secret", post(handlers::create_secret))
        .route(
            "/api/v1/secret/{id}",
            get(handlers::get_secret).delete(handlers::delete_secret),
        )
        .route_layer(from_fn_with_state(state.clone(), require_bearer_jwt));

    Router::new()
        .merge(secret_api)
        .route("/ping", get(handlers::liveness))
        .route("/healthcheck", get(handlers::healthcheck))
        .route("/metrics", get(handlers::metrics))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
