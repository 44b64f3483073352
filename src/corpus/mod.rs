//! Candidate pools for the selector: difficulty bands, part-of-speech and
//! folder filters over the stored corpus.

pub mod csv_import;

use serde::{Deserialize, Serialize};

use crate::engine::WordItem;
use crate::store::operations::words::CorpusEntry;

/// Difficulty is the entry's position in the corpus: the first 30% are easy,
/// the next 40% medium, the rest hard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    #[default]
    All,
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    fn band(self, len: usize) -> (usize, usize) {
        let cut = |ratio: f64| (len as f64 * ratio).floor() as usize;
        match self {
            Self::All => (0, len),
            Self::Easy => (0, cut(0.3)),
            Self::Medium => (cut(0.3), cut(0.7)),
            Self::Hard => (cut(0.7), len),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PoolFilter {
    pub difficulty: Difficulty,
    pub parts_of_speech: Vec<String>,
    pub folder: Option<String>,
}

/// Builds the candidate pool for a session of `count` words.
///
/// Each filter that leaves fewer than `count` words is dropped in favor of
/// the pool before it: an empty folder falls back to the whole corpus, a
/// thin difficulty band to the folder pool, a thin part-of-speech selection
/// to the difficulty band.
pub fn build_pool(corpus: &[CorpusEntry], filter: &PoolFilter, count: usize) -> Vec<WordItem> {
    let mut base: Vec<&CorpusEntry> = match filter.folder.as_deref() {
        Some(folder) => corpus
            .iter()
            .filter(|e| e.folders.iter().any(|f| f == folder))
            .collect(),
        None => corpus.iter().collect(),
    };
    if base.is_empty() {
        if let Some(folder) = filter.folder.as_deref() {
            tracing::warn!(folder, "Folder has no words, using the whole corpus");
        }
        base = corpus.iter().collect();
    }
    base.sort_by_key(|e| e.position);

    let (start, end) = filter.difficulty.band(base.len());
    let mut by_difficulty: &[&CorpusEntry] = &base[start..end];
    if by_difficulty.len() < count {
        tracing::debug!(
            difficulty = ?filter.difficulty,
            available = by_difficulty.len(),
            count,
            "Difficulty band too small, widening"
        );
        by_difficulty = &base;
    }

    let mut pool: Vec<&CorpusEntry> = by_difficulty.to_vec();
    if !filter.parts_of_speech.is_empty() {
        let by_pos: Vec<&CorpusEntry> = by_difficulty
            .iter()
            .copied()
            .filter(|e| filter.parts_of_speech.iter().any(|p| *p == e.item.part_of_speech))
            .collect();
        if by_pos.len() >= count {
            pool = by_pos;
        } else {
            tracing::debug!(available = by_pos.len(), count, "Part-of-speech filter too narrow, widening");
        }
    }

    pool.into_iter().map(|e| e.item.clone()).collect()
}
