mod health;
mod observe;
mod predict;

use axum::routing::post;
use axum::Router;

use crate::response::AppError;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/predict", post(predict::predict).fallback(fallback_handler))
        .route("/observe", post(observe::observe).fallback(fallback_handler))
        .nest("/health", health::router())
        .fallback(fallback_handler)
        .with_state(state)
}

async fn fallback_handler() -> AppError {
    AppError::not_found("route not found")
}
