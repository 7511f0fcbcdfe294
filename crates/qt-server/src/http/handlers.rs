//! REST endpoint handlers
//!
//! Thin adapters from HTTP to the session service: parse the body, call
//! the operation, serialize the snapshot or map the error to a status.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use qt_core::error::SessionError;
use qt_protocol::{
    AdvanceRequest, ErrorBody, JoinRequest, JoinResponse, LeaveRequest, SessionSnapshot,
};

use crate::state::AppState;

/// Session error carried across the axum boundary.
#[derive(Debug)]
pub struct ApiError(pub SessionError);

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            SessionError::NotFound => StatusCode::NOT_FOUND,
            SessionError::RoleTaken(_) => StatusCode::CONFLICT,
            SessionError::InvalidToken => StatusCode::UNAUTHORIZED,
            SessionError::NotAllowed { .. } => StatusCode::FORBIDDEN,
            SessionError::AlreadyComplete => StatusCode::CONFLICT,
        };
        let body = ErrorBody {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// `GET /healthz`
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// `POST /api/sessions`
pub async fn create_session(State(state): State<Arc<AppState>>) -> Json<SessionSnapshot> {
    Json(state.service.create().await)
}

/// `GET /api/sessions/:id`
pub async fn fetch_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let snapshot = state.service.fetch(&id).await?;
    Ok(Json(snapshot))
}

/// `POST /api/sessions/:id/join`
pub async fn join_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<JoinRequest>,
) -> Result<Json<JoinResponse>, ApiError> {
    let joined = state
        .service
        .join(&id, body.role, body.token.as_deref())
        .await?;
    Ok(Json(joined))
}

/// `POST /api/sessions/:id/advance`
pub async fn advance_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<AdvanceRequest>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let snapshot = state.service.advance(&id, &body.token).await?;
    Ok(Json(snapshot))
}

/// `POST /api/sessions/:id/leave`
pub async fn leave_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<LeaveRequest>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let snapshot = state.service.leave(&id, &body.token).await?;
    Ok(Json(snapshot))
}
