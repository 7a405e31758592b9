use axum::{routing::delete, routing::get, routing::post, routing::put, Router};

use crate::AppState;
use crate::http::handlers;

pub fn health() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health))
}

// `/comments/:id` carries the sort token on GET and the comment id otherwise.
pub fn comments() -> Router<AppState> {
    Router::new()
        .route("/comments", get(handlers::list_comments))
        .route("/comments", post(handlers::create_comment))
        .route("/comments/:id", get(handlers::list_comments_sorted))
        .route("/comments/:id", put(handlers::update_comment))
        .route("/comments/:id", delete(handlers::delete_comment))
}
