pub mod calendar;
pub mod flashcards;
pub mod health;
pub mod progress;
pub mod quiz;
pub mod words;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Json, Router};

use crate::constants::MAX_IMPORT_BYTES;
use crate::corpus::{build_pool, PoolFilter};
use crate::engine::WordItem;
use crate::response::{AppError, ErrorBody};
use crate::state::AppState;
use crate::validation::validate_session_size;

pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .nest("/words", words::router())
        .nest("/quiz", quiz::router())
        .nest("/flashcards", flashcards::router())
        .nest("/progress", progress::router())
        .nest("/stats", progress::stats_router())
        .nest("/calendar", calendar::router())
        .layer(DefaultBodyLimit::max(MAX_IMPORT_BYTES));

    Router::new()
        .nest("/api", api_routes)
        .nest("/health", health::router())
        .fallback(fallback_404)
        .with_state(state)
}

async fn fallback_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            success: false,
            code: "NOT_FOUND".to_string(),
            message: "Not found".to_string(),
        }),
    )
}

/// Candidate pool for a session of `count` words, read before the engine lock is taken.
pub(crate) fn session_pool(state: &AppState, filter: &PoolFilter, count: usize) -> Result<Vec<WordItem>, AppError> {
    validate_session_size(count).map_err(|e| AppError::bad_request("VALIDATION_ERROR", &e))?;
    let corpus = state.store().corpus_entries()?;
    Ok(build_pool(&corpus, filter, count))
}
