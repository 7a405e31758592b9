use axum::Router;

use crate::AppState;

mod cors;
mod error;
mod handlers;
mod routes;

pub use cors::cors_layer;
pub use error::AppError;

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health())
        .merge(routes::comments())
        .with_state(state)
}
