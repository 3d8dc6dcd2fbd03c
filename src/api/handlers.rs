//! Request handlers for the secret API, health checks and metrics.

use std::collections::HashMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::Deserialize;

use crate::api::{ApiError, ApiState, AuthenticatedPrincipal};
use crate::observability::render_metrics;

#[derive(Debug, Deserialize)]
pub struct CreateSecretRequest {
    pub body: String,
    #[serde(default)]
    pub meta: HashMap<String, String>,
}

/// `POST /api/v1/secret`
pub async fn create_secret(
    State(state): State<ApiState>,
    Extension(principal): Extension<AuthenticatedPrincipal>,
    headers: HeaderMap,
    payload: Result<Json<CreateSecretRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    state.counters.increment("http_create_secret_called", 1);

    let Json(request) = payload.map_err(|rejection| {
        state.counters.increment("http_create_secret_malformed", 1);
        ApiError::BadRequest(rejection.body_text())
    })?;

    let mut meta = request.meta;
    // "body" is reserved for the payload in some backends
    meta.remove("body");
    if let Some(user_agent) = headers.get(header::USER_AGENT).and_then(|v| v.to_str().ok()) {
        meta.insert("User-Agent".to_string(), user_agent.to_string());
    }

    tracing::debug!(subject = %principal.subject, "creating secret");
    let secret = state.service.create(request.body, meta).await.map_err(|err| {
        state.counters.increment("http_create_secret_error", 1);
        ApiError::from(err)
    })?;

    state.counters.increment("http_create_secret_success", 1);
    let location = format!("/api/v1/secret/{}", secret.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(secret)))
}

/// `GET /api/v1/secret/{id}`
pub async fn get_secret(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.counters.increment("http_get_secret_called", 1);

    match state.service.find_by_id(&id).await {
        Ok(secret) => {
            state.counters.increment("http_get_secret_success", 1);
            Ok(Json(secret))
        }
        Err(err) if err.is_not_found() => {
            state.counters.increment("http_get_secret_not_found", 1);
            Err(ApiError::from(err))
        }
        Err(err) => {
            state.counters.increment("http_get_secret_error", 1);
            Err(ApiError::from(err))
        }
    }
}

/// `DELETE /api/v1/secret/{id}`
pub async fn delete_secret(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.counters.increment("http_delete_secret_called", 1);

    match state.service.delete_by_id(&id).await {
        Ok(()) => {
            state.counters.increment("http_delete_secret_success", 1);
            Ok(StatusCode::NO_CONTENT)
        }
        Err(err) if err.is_not_found() => {
            state.counters.increment("http_delete_secret_not_found", 1);
            Err(ApiError::from(err))
        }
        Err(err) => {
            state.counters.increment("http_delete_secret_error", 1);
            Err(ApiError::from(err))
        }
    }
}

/// `GET /ping`: process liveness only, never touches the backend.
pub async fn liveness(State(state): State<ApiState>) -> StatusCode {
    state.counters.increment("ping_http", 1);
    StatusCode::NO_CONTENT
}

/// `GET /healthcheck`: verifies the storage backend is reachable.
pub async fn healthcheck(State(state): State<ApiState>) -> Result<String, ApiError> {
    state.counters.increment("healthcheck_http_called", 1);
    match state.service.ping().await {
        Ok(()) => {
            state.counters.increment("healthcheck_http_ok", 1);
            Ok("All systems online!".to_string())
        }
        Err(err) => {
            state.counters.increment("healthcheck_http_failed", 1);
            Err(ApiError::from(err))
        }
    }
}

/// `GET /metrics`: counter exposition in Prometheus text format.
pub async fn metrics(State(state): State<ApiState>) -> impl IntoResponse {
    let body = render_metrics(&state.counters, &state.hostname);
    ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
}
