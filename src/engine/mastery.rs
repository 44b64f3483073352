use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::types::null_as_default;

pub const RECENT_OUTCOMES_CAP: usize = 5;
pub const WEAKNESS_LIST_CAP: usize = 15;

/// Per-term performance history. Invariant: `correct <= attempts`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryRecord {
    #[serde(default)]
    pub attempts: u32,
    #[serde(default)]
    pub correct: u32,
    /// Most recent first.
    #[serde(
        default,
        alias = "recentAttempts",
        deserialize_with = "null_as_default"
    )]
    pub recent_outcomes: Vec<bool>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl MasteryRecord {
    /// Long-run accuracy, `0.0` with no attempts.
    pub fn accuracy(&self) -> f64 {
        if self.attempts == 0 {
            return 0.0;
        }
        self.correct as f64 / self.attempts as f64
    }

    /// Accuracy over the recent window, optimistic `1.0` when the window is empty.
    pub fn recent_accuracy(&self) -> f64 {
        if self.recent_outcomes.is_empty() {
            return 1.0;
        }
        let hits = self.recent_outcomes.iter().filter(|o| **o).count();
        hits as f64 / self.recent_outcomes.len() as f64
    }

    fn apply(&mut self, is_correct: bool, now: DateTime<Utc>) {
        self.attempts += 1;
        if is_correct {
            self.correct += 1;
        }
        self.recent_outcomes.insert(0, is_correct);
        self.recent_outcomes.truncate(RECENT_OUTCOMES_CAP);
        self.last_updated = Some(now);
    }
}

/// Per-term mastery records plus the bounded list of recent misses.
///
/// Records are created lazily on the first outcome and never removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MasteryStore {
    records: BTreeMap<String, MasteryRecord>,
    weakness_list: Vec<String>,
}

impl MasteryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(records: BTreeMap<String, MasteryRecord>, weakness_list: Vec<String>) -> Self {
        let mut weakness_list = weakness_list;
        weakness_list.truncate(WEAKNESS_LIST_CAP);
        Self {
            records,
            weakness_list,
        }
    }

    pub fn record_outcome(&mut self, term: &str, is_correct: bool, now: DateTime<Utc>) -> &MasteryRecord {
        if !is_correct && !self.weakness_list.iter().any(|t| t == term) {
            self.weakness_list.insert(0, term.to_string());
            self.weakness_list.truncate(WEAKNESS_LIST_CAP);
        }

        let record = self.records.entry(term.to_string()).or_default();
        record.apply(is_correct, now);
        record
    }

    pub fn get(&self, term: &str) -> Option<&MasteryRecord> {
        self.records.get(term)
    }

    pub fn accuracy(&self, term: &str) -> f64 {
        self.records.get(term).map(MasteryRecord::accuracy).unwrap_or(0.0)
    }

    pub fn recent_accuracy(&self, term: &str) -> f64 {
        self.records
            .get(term)
            .map(MasteryRecord::recent_accuracy)
            .unwrap_or(1.0)
    }

    pub fn in_weakness_list(&self, term: &str) -> bool {
        self.weakness_list.iter().any(|t| t == term)
    }

    pub fn weakness_list(&self) -> &[String] {
        &self.weakness_list
    }

    pub fn records(&self) -> &BTreeMap<String, MasteryRecord> {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
