use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::engine::mastery::{MasteryRecord, RECENT_OUTCOMES_CAP, WEAKNESS_LIST_CAP};

/// Vocabulary entry supplied by the corpus. The engine never mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordItem {
    pub term: String,
    #[serde(default)]
    pub part_of_speech: String,
    #[serde(default)]
    pub translation: String,
    #[serde(default)]
    pub example: String,
    #[serde(default)]
    pub idioms: String,
}

impl WordItem {
    pub fn new(term: &str, part_of_speech: &str, translation: &str) -> Self {
        Self {
            term: term.to_string(),
            part_of_speech: part_of_speech.to_string(),
            translation: translation.to_string(),
            example: String::new(),
            idioms: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    #[default]
    #[serde(alias = "en_to_ja")]
    TermToTranslation,
    #[serde(alias = "ja_to_en")]
    TranslationToTerm,
    #[serde(alias = "pos")]
    PartOfSpeech,
    #[serde(alias = "random")]
    Mixed,
}

impl QuestionType {
    pub fn label(self) -> &'static str {
        match self {
            Self::TermToTranslation => "Term → translation",
            Self::TranslationToTerm => "Translation → term",
            Self::PartOfSpeech => "Part of speech",
            Self::Mixed => "Mixed",
        }
    }
}

/// History entry kind: the four quiz types plus flashcard runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    #[default]
    #[serde(alias = "en_to_ja")]
    TermToTranslation,
    #[serde(alias = "ja_to_en")]
    TranslationToTerm,
    #[serde(alias = "pos")]
    PartOfSpeech,
    #[serde(alias = "random")]
    Mixed,
    Flashcard,
}

impl SessionKind {
    pub fn is_flashcard(self) -> bool {
        matches!(self, Self::Flashcard)
    }
}

impl From<QuestionType> for SessionKind {
    fn from(value: QuestionType) -> Self {
        match value {
            QuestionType::TermToTranslation => Self::TermToTranslation,
            QuestionType::TranslationToTerm => Self::TranslationToTerm,
            QuestionType::PartOfSpeech => Self::PartOfSpeech,
            QuestionType::Mixed => Self::Mixed,
        }
    }
}

/// Immutable summary appended to the session history.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionResult {
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: SessionKind,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub score: u32,
    pub time_seconds: u64,
    pub avg_answer_time: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub question_times: Vec<u32>,
}

/// Persisted progress blob. Every field is optional on read and the field
/// names of the old browser app are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressData {
    #[serde(alias = "totalTests")]
    pub total_sessions: u32,
    #[serde(alias = "wordMastery", deserialize_with = "null_as_default")]
    pub mastery: BTreeMap<String, MasteryRecord>,
    #[serde(alias = "recentlyWrongWords", deserialize_with = "null_as_default")]
    pub weakness_list: Vec<String>,
    #[serde(alias = "testHistory", deserialize_with = "null_as_default")]
    pub history: Vec<SessionResult>,
}

impl ProgressData {
    pub fn from_json(bytes: &[u8]) -> Result<Self, EngineError> {
        serde_json::from_slice::<Self>(bytes)
            .map(Self::normalized)
            .map_err(|e| EngineError::MalformedPersistedData(e.to_string()))
    }

    /// Repairs values older blobs may carry: `correct > attempts`, over-long
    /// outcome lists, duplicated weakness entries.
    pub fn normalized(mut self) -> Self {
        for record in self.mastery.values_mut() {
            record.correct = record.correct.min(record.attempts);
            record.recent_outcomes.truncate(RECENT_OUTCOMES_CAP);
        }

        let mut seen = std::collections::HashSet::new();
        self.weakness_list.retain(|term| seen.insert(term.clone()));
        self.weakness_list.truncate(WEAKNESS_LIST_CAP);

        let history_len = u32::try_from(self.history.len()).unwrap_or(u32::MAX);
        self.total_sessions = self.total_sessions.max(history_len);
        self
    }
}

/// Treats an explicit JSON `null` the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("no candidate words available for a session")]
    EmptySelection,
    #[error("`{operation}` is not allowed while the session is {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },
    #[error("persisted data is malformed: {0}")]
    MalformedPersistedData(String),
    #[error("no active {0} session")]
    NoActiveSession(&'static str),
    #[error("option {index} is out of range (question has {len} options)")]
    OptionOutOfRange { index: usize, len: usize },
}
