use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;

use crate::constants::DEFAULT_REVIEW_LIMIT;
use crate::response::{ok, AppError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(summary))
        .route("/mastery", get(mastery_table))
        .route("/weaknesses", get(review_list))
}

pub fn stats_router() -> Router<AppState> {
    Router::new()
        .route("/", get(history_stats))
        .route("/daily", get(daily_performance))
}

async fn summary(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state.engine().await.summary()))
}

async fn mastery_table(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let corpus = state.store().corpus_items()?;
    Ok(ok(state.engine().await.mastery_table(&corpus)))
}

#[derive(Debug, Deserialize)]
struct ReviewQuery {
    limit: Option<usize>,
}

async fn review_list(
    Query(query): Query<ReviewQuery>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_REVIEW_LIMIT).max(1);
    let corpus = state.store().corpus_items()?;
    Ok(ok(state.engine().await.review_list(&corpus, limit)))
}

async fn history_stats(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state.engine().await.history_stats()))
}

async fn daily_performance(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state.engine().await.daily_performance()))
}
