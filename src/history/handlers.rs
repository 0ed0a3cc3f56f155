use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{delete, get},
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{AddHistoryRequest, MessageResponse},
    repo::SearchHistory,
};
use crate::{
    auth::middleware::{require_auth, AuthUser},
    error::AppError,
    state::AppState,
};

pub const HISTORY_LIMIT: i64 = 50;

pub fn history_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/history",
            get(list_history).post(add_history).delete(clear_history),
        )
        .route("/history/:id", delete(delete_history))
        .route_layer(from_fn_with_state(state.jwt.clone(), require_auth))
}

#[instrument(skip(state))]
pub async fn list_history(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
) -> Result<Json<Vec<SearchHistory>>, AppError> {
    let rows = state.history.list_recent(ctx.user_id, HISTORY_LIMIT).await?;
    Ok(Json(rows))
}

#[instrument(skip(state, payload))]
pub async fn add_history(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    payload: Result<Json<AddHistoryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SearchHistory>), AppError> {
    let Json(payload) = payload?;
    let query = payload.query.trim();
    if query.is_empty() {
        return Err(AppError::InvalidPayload("Query is required".into()));
    }

    let entry = state.history.record(ctx.user_id, query).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

#[instrument(skip(state))]
pub async fn delete_history(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    id: Result<Path<i64>, axum::extract::rejection::PathRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Path(id) = id.map_err(|_| AppError::InvalidPayload("Invalid history id".into()))?;

    if !state.history.delete(ctx.user_id, id).await? {
        return Err(AppError::NotFound("History not found"));
    }
    Ok(Json(MessageResponse {
        message: "History deleted successfully",
    }))
}

#[instrument(skip(state))]
pub async fn clear_history(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
) -> Result<Json<MessageResponse>, AppError> {
    let removed = state.history.clear(ctx.user_id).await?;
    info!(user_id = %ctx.user_id, removed, "history cleared");
    Ok(Json(MessageResponse {
        message: "History cleared successfully",
    }))
}
