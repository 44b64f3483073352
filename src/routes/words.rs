use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::corpus::csv_import;
use crate::engine::WordItem;
use crate::extractors::JsonBody;
use crate::response::{created, ok, paginated, AppError};
use crate::state::AppState;
use crate::store::operations::words::CorpusEntry;
use crate::validation::{trimmed, validate_folder, validate_word_item};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_words).post(upsert_word))
        .route("/folders", get(list_folders))
        .route("/import", post(import_csv))
        .route("/:term", get(get_word).delete(delete_word))
}

/// Word as returned by the API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WordView {
    #[serde(flatten)]
    item: WordItem,
    folders: Vec<String>,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<CorpusEntry> for WordView {
    fn from(entry: CorpusEntry) -> Self {
        Self {
            item: entry.item,
            folders: entry.folders,
            created_at: entry.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListWordsQuery {
    page: Option<u64>,
    per_page: Option<u64>,
    folder: Option<String>,
}

impl ListWordsQuery {
    fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    fn per_page(&self) -> u64 {
        self.per_page.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }
}

async fn list_words(
    Query(query): Query<ListWordsQuery>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let page = query.page();
    let per_page = query.per_page();
    let offset = ((page - 1) * per_page) as usize;

    let (entries, total) = state
        .store()
        .list_words(query.folder.as_deref(), per_page as usize, offset)?;
    let items: Vec<WordView> = entries.into_iter().map(WordView::from).collect();
    Ok(paginated(items, total as u64, page, per_page))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertWordRequest {
    #[serde(flatten)]
    item: WordItem,
    #[serde(default)]
    folders: Vec<String>,
}

async fn upsert_word(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<UpsertWordRequest>,
) -> Result<impl IntoResponse, AppError> {
    let item = trimmed(&req.item);
    validate_word_item(&item).map_err(|e| AppError::bad_request("VALIDATION_ERROR", &e))?;

    let mut folders = Vec::with_capacity(req.folders.len());
    for folder in &req.folders {
        validate_folder(folder).map_err(|e| AppError::bad_request("VALIDATION_ERROR", &e))?;
        folders.push(folder.trim().to_string());
    }

    let entry = state.store().upsert_word(&item, &folders)?;
    tracing::info!(term = %entry.item.term, folders = ?entry.folders, "Word saved");
    Ok(created(WordView::from(entry)))
}

async fn get_word(
    Path(term): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let entry = state
        .store()
        .get_word(&term)?
        .ok_or_else(|| AppError::not_found("Word not found"))?;
    Ok(ok(WordView::from(entry)))
}

async fn delete_word(
    Path(term): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    if !state.store().delete_word(&term)? {
        return Err(AppError::not_found("Word not found"));
    }
    Ok(ok(serde_json::json!({"deleted": true, "term": term})))
}

async fn list_folders(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let counts: BTreeMap<String, usize> = state.store().folder_counts()?;
    Ok(ok(counts))
}

#[derive(Debug, Deserialize)]
struct ImportQuery {
    folder: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImportSummary {
    imported: usize,
    skipped: usize,
    folder: Option<String>,
}

/// CSV text body with a header row.
async fn import_csv(
    Query(query): Query<ImportQuery>,
    State(state): State<AppState>,
    body: String,
) -> Result<impl IntoResponse, AppError> {
    let folder = match query.folder.as_deref().map(str::trim) {
        Some(f) if !f.is_empty() => {
            validate_folder(f).map_err(|e| AppError::bad_request("VALIDATION_ERROR", &e))?;
            Some(f.to_string())
        }
        _ => None,
    };

    let parsed = csv_import::parse_words(body.as_bytes())?;
    let mut skipped = parsed.skipped;
    let valid: Vec<WordItem> = parsed
        .words
        .iter()
        .map(trimmed)
        .filter(|item| match validate_word_item(item) {
            Ok(()) => true,
            Err(reason) => {
                tracing::debug!(term = %item.term, %reason, "Import row rejected");
                skipped += 1;
                false
            }
        })
        .collect();

    let imported = state.store().import_words(&valid, folder.as_deref())?;
    tracing::info!(imported, skipped, folder = ?folder, "CSV import finished");
    Ok(ok(ImportSummary {
        imported,
        skipped,
        folder,
    }))
}
