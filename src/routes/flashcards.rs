use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use chrono::Utc;
use serde::Deserialize;

use crate::corpus::PoolFilter;
use crate::engine::{DeckStep, QuestionType};
use crate::extractors::JsonBody;
use crate::response::{created, ok, AppError};
use crate::routes::quiz::StepView;
use crate::routes::session_pool;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(deck_status).delete(abandon_deck))
        .route("/start", post(start_deck))
        .route("/card", get(current_card))
        .route("/known", post(mark_known))
        .route("/unknown", post(mark_unknown))
        .route("/prev", post(previous_card))
        .route("/next", post(next_card))
        .route("/finish", post(finish_deck))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartDeckRequest {
    count: Option<usize>,
    #[serde(default)]
    direction: QuestionType,
    #[serde(default = "default_true")]
    enable_sound: bool,
    #[serde(flatten)]
    filter: PoolFilter,
}

fn default_true() -> bool {
    true
}

impl From<DeckStep> for StepView {
    fn from(step: DeckStep) -> Self {
        match step {
            DeckStep::Moved { index } => Self {
                completed: false,
                index: Some(index),
                result: None,
            },
            DeckStep::Finished(result) => Self {
                completed: true,
                index: None,
                result: Some(result),
            },
        }
    }
}

async fn start_deck(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<StartDeckRequest>,
) -> Result<impl IntoResponse, AppError> {
    let count = match req.count {
        Some(count) => count,
        None => state.engine().await.config().default_flashcard_count,
    };
    let pool = session_pool(&state, &req.filter, count)?;
    let status = state.engine().await.start_flashcards(
        &pool,
        Some(count),
        req.direction,
        req.enable_sound,
        Utc::now(),
    )?;
    tracing::info!(deck_id = %status.id, total = status.total, direction = ?status.direction, "Flashcards started");
    Ok(created(status))
}

async fn deck_status(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state.engine().await.deck_status(Utc::now())?))
}

async fn current_card(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state.engine().await.current_card()?))
}

async fn mark_known(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let step = state.engine().await.mark_card(true, Utc::now())?;
    Ok(ok(StepView::from(step)))
}

async fn mark_unknown(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let step = state.engine().await.mark_card(false, Utc::now())?;
    Ok(ok(StepView::from(step)))
}

async fn previous_card(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let index = state.engine().await.previous_card(Utc::now())?;
    Ok(ok(serde_json::json!({ "index": index })))
}

async fn next_card(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let step = state.engine().await.next_card(Utc::now())?;
    Ok(ok(StepView::from(step)))
}

async fn finish_deck(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let result = state.engine().await.finish_flashcards(Utc::now())?;
    Ok(ok(result))
}

async fn abandon_deck(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let abandoned = state.engine().await.abandon_flashcards();
    if abandoned {
        tracing::info!("Flashcard deck abandoned");
    }
    Ok(ok(serde_json::json!({ "abandoned": abandoned })))
}
