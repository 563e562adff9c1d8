//! REST API handlers
//!
//! Thin adapters from HTTP requests onto [`VerificationWorkflow`] operations.
//!
//! [`VerificationWorkflow`]: victory_identity::VerificationWorkflow

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, warn};
use victory_identity::VerifyError;

use crate::dto::{
    ApiError, IdentityResponse, PendingResponse, RedeemDto, RegisterDto, UpdateDto,
    UpdateResponse, UserQuery, ValidateDto, ValidateResponse,
};
use crate::state::AppState;

pub type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

/// Map a workflow error onto an HTTP status and error body.
pub fn error_response(err: VerifyError) -> (StatusCode, Json<ApiError>) {
    let status = match &err {
        VerifyError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        VerifyError::UnauthorizedDomain { .. } => StatusCode::UNAUTHORIZED,
        VerifyError::NotFound => StatusCode::NOT_FOUND,
        VerifyError::Conflict { .. } => StatusCode::CONFLICT,
        VerifyError::InvalidOrExpiredCode => StatusCode::GONE,
        VerifyError::NotificationFailed(_) => StatusCode::BAD_GATEWAY,
        VerifyError::CodeSpaceExhausted { .. } | VerifyError::StoreUnavailable(_) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
    };

    if status.is_server_error() {
        error!(kind = err.kind(), error = %err, "Request failed");
    }

    // Infrastructure details stay in the log
    let message = match &err {
        VerifyError::StoreUnavailable(_) => "Service temporarily unavailable".to_string(),
        VerifyError::NotificationFailed(_) => "Could not send verification email".to_string(),
        other => other.to_string(),
    };
    (status, Json(ApiError::new(err.kind(), message)))
}

/// As [`error_response`], except a disallowed current email is a 400.
fn update_error_response(err: VerifyError) -> (StatusCode, Json<ApiError>) {
    match err {
        VerifyError::UnauthorizedDomain { .. } => {
            (StatusCode::BAD_REQUEST, Json(ApiError::new(err.kind(), err.to_string())))
        }
        other => error_response(other),
    }
}

fn parse_error(rejection: JsonRejection) -> (StatusCode, Json<ApiError>) {
    warn!(error = %rejection.body_text(), "Rejected request body");
    (
        StatusCode::BAD_REQUEST,
        Json(ApiError::bad_request("Unable to parse JSON")),
    )
}

/// `POST /api/v1/validate`: is this public key registered?
pub async fn validate(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ValidateDto>, JsonRejection>,
) -> ApiResult<Json<ValidateResponse>> {
    let Json(dto) = body.map_err(parse_error)?;
    let registered = state
        .workflow
        .check_public_key_registered(&dto.public_key)
        .await
        .map_err(error_response)?;

    if registered {
        Ok(Json(ValidateResponse { registered }))
    } else {
        Err((
            StatusCode::NOT_FOUND,
            Json(ApiError::new("not_found", "Public key is not registered")),
        ))
    }
}

/// `POST /api/v1/register`
pub async fn register(
    State(state): State<Arc<AppState>>,
    body: Result<Json<RegisterDto>, JsonRejection>,
) -> ApiResult<Json<PendingResponse>> {
    let Json(dto) = body.map_err(parse_error)?;
    let receipt = state
        .workflow
        .submit_registration(dto.into())
        .await
        .map_err(error_response)?;
    Ok(Json(receipt.into()))
}

/// `POST /api/v1/update`
pub async fn update(
    State(state): State<Arc<AppState>>,
    body: Result<Json<UpdateDto>, JsonRejection>,
) -> ApiResult<Json<PendingResponse>> {
    let Json(dto) = body.map_err(parse_error)?;
    let receipt = state
        .workflow
        .submit_update(dto.into())
        .await
        .map_err(update_error_response)?;
    Ok(Json(receipt.into()))
}

/// `GET /api/v1/user?email=`: alias for an email, as plain text.
pub async fn user(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> ApiResult<String> {
    let email = query
        .email
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                Json(ApiError::bad_request("Email query parameter is required")),
            )
        })?;

    state
        .workflow
        .lookup_alias_by_email(&email)
        .await
        .map_err(error_response)
}

/// `POST /api/v1/verify-registration`
pub async fn verify_registration(
    State(state): State<Arc<AppState>>,
    body: Result<Json<RedeemDto>, JsonRejection>,
) -> ApiResult<Json<IdentityResponse>> {
    let Json(dto) = body.map_err(parse_error)?;
    let code = dto.verification_code().map_err(error_response)?;
    let identity = state
        .workflow
        .redeem_registration(code)
        .await
        .map_err(error_response)?;
    Ok(Json(identity.into()))
}

/// `POST /api/v1/verify-update`
pub async fn verify_update(
    State(state): State<Arc<AppState>>,
    body: Result<Json<RedeemDto>, JsonRejection>,
) -> ApiResult<Json<UpdateResponse>> {
    let Json(dto) = body.map_err(parse_error)?;
    let code = dto.verification_code().map_err(error_response)?;
    let applied = state
        .workflow
        .redeem_update(code)
        .await
        .map_err(error_response)?;
    Ok(Json(applied.into()))
}

/// `GET /health`
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<Value>) {
    let timestamp = Utc::now().to_rfc3339();
    let counts = match state.database.ping().await {
        Ok(()) => state.ledger.live_counts().await,
        Err(e) => Err(e),
    };

    match counts {
        Ok((registrations, updates)) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "service": "victory-api",
                "timestamp": timestamp,
                "pending": {
                    "registrations": registrations,
                    "updates": updates
                }
            })),
        ),
        Err(e) => {
            error!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "service": "victory-api",
                    "timestamp": timestamp
                })),
            )
        }
    }
}
