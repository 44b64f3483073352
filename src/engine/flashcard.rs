use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;

use crate::engine::mastery::MasteryStore;
use crate::engine::question::part_of_speech_label;
use crate::engine::reporting::round_to_tenth;
use crate::engine::session::SessionPhase;
use crate::engine::types::{EngineError, QuestionType, SessionKind, SessionResult, WordItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CardMark {
    Unmarked,
    Known,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub index: usize,
    pub total: usize,
    pub front: String,
    pub back: String,
    pub hint: String,
    pub example: Option<String>,
    pub idioms: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech_cue: Option<String>,
    pub mark: CardMark,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeckStep {
    Moved { index: usize },
    Finished(SessionResult),
}

/// Self-graded flashcard run. Marking a card reports to the mastery store
/// once; later re-marks only change the card's mark.
#[derive(Debug, Clone)]
pub struct FlashcardDeck {
    id: String,
    direction: QuestionType,
    enable_sound: bool,
    words: Vec<WordItem>,
    term_front: Vec<bool>,
    marks: Vec<CardMark>,
    current_index: usize,
    phase: SessionPhase,
    started_at: DateTime<Utc>,
    last_activity_at: DateTime<Utc>,
}

impl FlashcardDeck {
    /// `Mixed` decides the face of each card once, here.
    pub fn start<R: Rng + ?Sized>(
        id: impl Into<String>,
        direction: QuestionType,
        words: Vec<WordItem>,
        enable_sound: bool,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<Self, EngineError> {
        if words.is_empty() {
            return Err(EngineError::EmptySelection);
        }

        let term_front = words
            .iter()
            .map(|_| match direction {
                QuestionType::TranslationToTerm => false,
                QuestionType::Mixed => rng.gen_bool(0.5),
                _ => true,
            })
            .collect();

        Ok(Self {
            id: id.into(),
            direction,
            enable_sound,
            marks: vec![CardMark::Unmarked; words.len()],
            words,
            term_front,
            current_index: 0,
            phase: SessionPhase::InProgress,
            started_at: now,
            last_activity_at: now,
        })
    }

    pub fn current_card(&self) -> Result<Card, EngineError> {
        self.require_in_progress("current_card")?;
        let index = self.current_index;
        let word = &self.words[index];
        let term_front = self.term_front[index];

        let (front, back) = if term_front {
            (word.term.clone(), word.translation.clone())
        } else {
            (word.translation.clone(), word.term.clone())
        };

        Ok(Card {
            index,
            total: self.words.len(),
            front,
            back,
            hint: format!("[{}]", part_of_speech_label(&word.part_of_speech)),
            example: non_empty(&word.example),
            idioms: non_empty(&word.idioms),
            speech_cue: (self.enable_sound && term_front).then(|| word.term.clone()),
            mark: self.marks[index],
        })
    }

    /// Marks the current card and moves on; marking the last card finishes the deck.
    pub fn mark(&mut self, mastery: &mut MasteryStore, known: bool, now: DateTime<Utc>) -> Result<DeckStep, EngineError> {
        self.require_in_progress("mark")?;
        let index = self.current_index;

        if self.marks[index] == CardMark::Unmarked {
            mastery.record_outcome(&self.words[index].term, known, now);
        }
        self.marks[index] = if known { CardMark::Known } else { CardMark::Unknown };

        self.next(now)
    }

    pub fn next(&mut self, now: DateTime<Utc>) -> Result<DeckStep, EngineError> {
        self.require_in_progress("next")?;
        self.last_activity_at = now;

        if self.current_index + 1 < self.words.len() {
            self.current_index += 1;
            return Ok(DeckStep::Moved {
                index: self.current_index,
            });
        }
        self.finish(now).map(DeckStep::Finished)
    }

    /// Steps back one card; stays put on the first card.
    pub fn previous(&mut self, now: DateTime<Utc>) -> Result<usize, EngineError> {
        self.require_in_progress("previous")?;
        self.last_activity_at = now;
        self.current_index = self.current_index.saturating_sub(1);
        Ok(self.current_index)
    }

    pub fn finish(&mut self, now: DateTime<Utc>) -> Result<SessionResult, EngineError> {
        self.require_in_progress("finish")?;
        self.phase = SessionPhase::Completed;
        self.last_activity_at = now;

        let known = self.known_count() as u32;
        let answered = known + self.unknown_count() as u32;
        let elapsed = (now - self.started_at).num_seconds().max(0) as u64;

        let (score, avg_answer_time) = if answered > 0 {
            (
                (known as f64 / answered as f64 * 100.0).round() as u32,
                round_to_tenth(elapsed as f64 / answered as f64),
            )
        } else {
            (0, 0.0)
        };

        Ok(SessionResult {
            date: now,
            kind: SessionKind::Flashcard,
            total_questions: self.words.len() as u32,
            correct_answers: known,
            score,
            time_seconds: elapsed,
            avg_answer_time,
            question_times: Vec::new(),
        })
    }

    fn require_in_progress(&self, operation: &'static str) -> Result<(), EngineError> {
        if self.phase == SessionPhase::InProgress {
            Ok(())
        } else {
            Err(EngineError::InvalidState {
                operation,
                state: self.phase.as_str(),
            })
        }
    }

    pub fn current_mark(&self) -> Option<CardMark> {
        self.marks.get(self.current_index).copied()
    }

    pub fn known_count(&self) -> usize {
        self.marks.iter().filter(|m| **m == CardMark::Known).count()
    }

    pub fn unknown_count(&self) -> usize {
        self.marks.iter().filter(|m| **m == CardMark::Unknown).count()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn direction(&self) -> QuestionType {
        self.direction
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn words(&self) -> &[WordItem] {
        &self.words
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn last_activity_at(&self) -> DateTime<Utc> {
        self.last_activity_at
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
