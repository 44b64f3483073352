use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use chrono::{Datelike, NaiveDate, Utc};
use serde::Deserialize;

use crate::response::{ok, AppError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(month_view))
        .route("/days/:date", get(day_detail))
}

#[derive(Debug, Deserialize)]
struct MonthQuery {
    year: Option<i32>,
    month: Option<u32>,
}

/// Defaults to the current UTC month.
async fn month_view(
    Query(query): Query<MonthQuery>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let today = Utc::now().date_naive();
    let year = query.year.unwrap_or(today.year());
    let month = query.month.unwrap_or(today.month());

    let view = state
        .engine()
        .await
        .month_view(year, month, today)
        .ok_or_else(|| AppError::bad_request("INVALID_MONTH", "year/month is not a valid calendar month"))?;
    Ok(ok(view))
}

async fn day_detail(
    Path(date): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
        .map_err(|_| AppError::bad_request("INVALID_DATE", "date must be YYYY-MM-DD"))?;

    let engine = state.engine().await;
    let day = engine
        .study_record()
        .day(date)
        .cloned()
        .ok_or_else(|| AppError::not_found("No study activity on this day"))?;
    Ok(ok(day))
}
