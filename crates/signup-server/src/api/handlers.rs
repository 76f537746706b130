//! HTTP request handlers.

use super::types::{HealthResponse, SignupForm, ValidationFailureResponse};
use super::AppState;
use crate::error::{AppError, ErrorCode};
use crate::validation::{validate, VALIDATION_MESSAGE};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;

/// Health check endpoint.
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, AppError> {
    let member_count = state
        .service
        .store()
        .count()
        .await
        .map_err(|e| AppError::unknown(e.to_string()))?;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        member_count,
    }))
}

/// Validate a sign-up form and register the applicant.
///
/// Field violations and unreadable bodies are answered without touching
/// the member store.
pub async fn signup(
    State(state): State<AppState>,
    form: Result<Json<SignupForm>, JsonRejection>,
) -> Response {
    let form = match form {
        Ok(Json(form)) => form,
        Err(rejection) => {
            let detail = rejection.body_text();
            info!(%detail, "Sign-up body rejected");
            let error = AppError::validation(VALIDATION_MESSAGE);
            let body = ValidationFailureResponse {
                success: false,
                error: error.body(),
                violations: Vec::new(),
            };
            return tagged(error.http_status(), Json(body), Some(error.code));
        }
    };

    let request = match validate(&form) {
        Ok(request) => request,
        Err(errors) => {
            info!(violations = errors.len(), "Sign-up form rejected");
            let error = AppError::from(&errors);
            let body = ValidationFailureResponse {
                success: false,
                error: error.body(),
                violations: errors.violations().to_vec(),
            };
            return tagged(error.http_status(), Json(body), Some(error.code));
        }
    };

    let outcome = state.service.register(request).await;
    let status =
        StatusCode::from_u16(outcome.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let body = outcome.into_response();
    let code = body.code();
    tagged(status, Json(body), code)
}

/// Attach the failure code so the access log can report it.
fn tagged(status: StatusCode, body: impl IntoResponse, code: Option<ErrorCode>) -> Response {
    let mut response = (status, body).into_response();
    if let Some(code) = code {
        response.extensions_mut().insert(code);
    }
    response
}
