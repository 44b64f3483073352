use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::corpus::{Difficulty, PoolFilter};
use crate::engine::{Advance, AnswerInput, EngineError, QuizSettings, SessionResult};
use crate::extractors::JsonBody;
use crate::response::{created, ok, AppError};
use crate::routes::session_pool;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(quiz_status).delete(abandon_quiz))
        .route("/start", post(start_quiz))
        .route("/quick", post(start_quick_test))
        .route("/retry", post(retry_quiz))
        .route("/question", get(current_question))
        .route("/answer", post(submit_answer))
        .route("/next", post(advance))
        .route("/finish", post(finish_quiz))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartQuizRequest {
    #[serde(flatten)]
    settings: QuizSettings,
    #[serde(flatten)]
    filter: PoolFilter,
}

/// Folder and difficulty as query parameters for the body-less starts.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct PoolQuery {
    folder: Option<String>,
    difficulty: Option<Difficulty>,
}

impl PoolQuery {
    pub(crate) fn into_filter(self) -> PoolFilter {
        PoolFilter {
            difficulty: self.difficulty.unwrap_or_default(),
            parts_of_speech: Vec::new(),
            folder: self.folder.filter(|f| !f.trim().is_empty()),
        }
    }
}

async fn start_quiz(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<StartQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    let pool = session_pool(&state, &req.filter, req.settings.count)?;
    let status = state.engine().await.start_quiz(&pool, req.settings, Utc::now())?;
    tracing::info!(
        session_id = %status.id,
        question_type = ?status.question_type,
        total = status.total,
        "Quiz started"
    );
    Ok(created(status))
}

async fn start_quick_test(
    Query(query): Query<PoolQuery>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let count = state.engine().await.config().quick_test_size;
    let pool = session_pool(&state, &query.into_filter(), count)?;
    let status = state.engine().await.start_quick_test(&pool, Utc::now())?;
    tracing::info!(session_id = %status.id, total = status.total, "Quick test started");
    Ok(created(status))
}

async fn retry_quiz(
    Query(query): Query<PoolQuery>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let mut engine = state.engine().await;
    let settings = engine
        .last_quiz_settings()
        .ok_or(EngineError::NoActiveSession("quiz"))?;
    let pool = session_pool(&state, &query.into_filter(), settings.count)?;
    let status = engine.retry_quiz(&pool, Utc::now())?;
    Ok(created(status))
}

async fn quiz_status(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let status = state.engine().await.quiz_status(Utc::now())?;
    Ok(ok(status))
}

async fn current_question(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let corpus = state.store().corpus_items()?;
    let question = state.engine().await.current_question(&corpus)?;
    Ok(ok(question))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnswerRequest {
    /// Index into the presented options.
    choice: Option<usize>,
    /// Verdict for answers judged by the client.
    correct: Option<bool>,
    elapsed_seconds: Option<i64>,
}

async fn submit_answer(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<AnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let input = match (req.choice, req.correct) {
        (Some(index), None) => AnswerInput::Choice(index),
        (None, Some(verdict)) => AnswerInput::Verdict(verdict),
        _ => {
            return Err(AppError::bad_request(
                "VALIDATION_ERROR",
                "exactly one of choice or correct is required",
            ))
        }
    };

    let feedback = state
        .engine()
        .await
        .submit_answer(input, req.elapsed_seconds, Utc::now())?;
    Ok(ok(feedback))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StepView {
    pub completed: bool,
    pub index: Option<usize>,
    pub result: Option<SessionResult>,
}

impl From<Advance> for StepView {
    fn from(step: Advance) -> Self {
        match step {
            Advance::Next { index } => Self {
                completed: false,
                index: Some(index),
                result: None,
            },
            Advance::Completed(result) => Self {
                completed: true,
                index: None,
                result: Some(result),
            },
        }
    }
}

async fn advance(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let step = state.engine().await.advance_quiz(Utc::now())?;
    Ok(ok(StepView::from(step)))
}

async fn finish_quiz(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let result = state.engine().await.finish_quiz(Utc::now())?;
    tracing::info!(score = result.score, total = result.total_questions, "Quiz finished early");
    Ok(ok(result))
}

async fn abandon_quiz(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let abandoned = state.engine().await.abandon_quiz();
    if abandoned {
        tracing::info!("Quiz abandoned");
    }
    Ok(ok(serde_json::json!({ "abandoned": abandoned })))
}
