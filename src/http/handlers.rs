use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::app::comments::CommentService;
use crate::domain::comment::{Comment, SortMode};
use crate::http::AppError;
use crate::AppState;

const COMMENT_NOT_FOUND: &str = "Comment not found";

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
}

pub(crate) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = if state.db.ping().await.is_ok() {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse { status })
}

#[derive(Deserialize)]
pub struct CommentTextRequest {
    pub text: String,
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub detail: &'static str,
}

pub async fn list_comments(
    State(state): State<AppState>,
) -> Result<Json<Vec<Comment>>, AppError> {
    list_sorted(&state, SortMode::Unsorted).await
}

pub async fn list_comments_sorted(
    State(state): State<AppState>,
    Path(sort): Path<String>,
) -> Result<Json<Vec<Comment>>, AppError> {
    tracing::debug!(sort = %sort, "listing comments");
    list_sorted(&state, SortMode::from_token(&sort)).await
}

async fn list_sorted(state: &AppState, sort: SortMode) -> Result<Json<Vec<Comment>>, AppError> {
    let service = CommentService::new(state.db.clone());
    let comments = service.list(sort).await.map_err(|err| {
        tracing::error!(error = ?err, "failed to list comments");
        AppError::internal("failed to list comments")
    })?;

    Ok(Json(comments))
}

pub async fn create_comment(
    State(state): State<AppState>,
    Json(payload): Json<CommentTextRequest>,
) -> Result<Json<Comment>, AppError> {
    let service = CommentService::new(state.db.clone());
    let comment = service.create(payload.text).await.map_err(|err| {
        tracing::error!(error = ?err, "failed to create comment");
        AppError::internal("failed to create comment")
    })?;

    tracing::info!(comment_id = %comment.id, "comment created");
    Ok(Json(comment))
}

pub async fn update_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
    Json(payload): Json<CommentTextRequest>,
) -> Result<Json<Comment>, AppError> {
    let service = CommentService::new(state.db.clone());
    let comment = service
        .update_text(&comment_id, payload.text)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, comment_id = %comment_id, "failed to update comment");
            AppError::internal("failed to update comment")
        })?;

    match comment {
        Some(comment) => Ok(Json(comment)),
        None => Err(AppError::not_found(COMMENT_NOT_FOUND)),
    }
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    let service = CommentService::new(state.db.clone());
    let deleted = service.delete(&comment_id).await.map_err(|err| {
        tracing::error!(error = ?err, comment_id = %comment_id, "failed to delete comment");
        AppError::internal("failed to delete comment")
    })?;

    if !deleted {
        return Err(AppError::not_found(COMMENT_NOT_FOUND));
    }

    tracing::info!(comment_id = %comment_id, "comment deleted");
    Ok(Json(DeleteResponse {
        detail: "Comment deleted",
    }))
}
