pub mod config;
pub mod flashcard;
pub mod mastery;
pub mod question;
pub mod recency;
pub mod reporting;
pub mod selector;
pub mod session;
pub mod study_record;
pub mod types;

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::store::StoreError;

pub use config::{EngineConfig, SelectorWeights};
pub use flashcard::{Card, CardMark, DeckStep, FlashcardDeck};
pub use mastery::{MasteryRecord, MasteryStore};
pub use question::Question;
pub use recency::RecencyWindow;
pub use session::{Advance, QuestionState, SessionOptions, SessionPhase, TestSession};
pub use study_record::StudyRecord;
pub use types::{EngineError, ProgressData, QuestionType, SessionKind, SessionResult, WordItem};

/// Write-through persistence for learner state.
pub trait ProgressSink: Send + Sync {
    fn save_progress(&self, progress: &ProgressData) -> Result<(), StoreError>;
    fn save_study_record(&self, record: &StudyRecord) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSettings {
    #[serde(default)]
    pub question_type: QuestionType,
    pub count: usize,
    #[serde(default)]
    pub options: SessionOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerInput {
    /// Index into the presented question's options.
    Choice(usize),
    /// Verdict judged by the caller.
    Verdict(bool),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerFeedback {
    pub term: String,
    pub is_correct: bool,
    pub already_answered: bool,
    pub elapsed_seconds: u32,
    pub correct_answer: String,
    pub example: Option<String>,
    pub idioms: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech_cue: Option<String>,
    pub is_last_question: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizStatus {
    pub id: String,
    pub phase: SessionPhase,
    pub question_type: QuestionType,
    pub options: SessionOptions,
    pub current_index: usize,
    pub total: usize,
    pub answered: usize,
    pub correct: usize,
    pub timer_seconds: u64,
    pub answers: Vec<QuestionState>,
    pub started_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckStatus {
    pub id: String,
    pub phase: SessionPhase,
    pub direction: QuestionType,
    pub current_index: usize,
    pub total: usize,
    pub known: usize,
    pub unknown: usize,
    pub elapsed_seconds: u64,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdleSweep {
    pub quiz: bool,
    pub flashcards: bool,
}

/// Owns all learner state and exposes the session commands.
///
/// Every mutation is written through the sink; a failed save is logged and
/// the in-memory state stays authoritative.
pub struct VocabEngine {
    config: EngineConfig,
    mastery: MasteryStore,
    recency: RecencyWindow,
    history: Vec<SessionResult>,
    total_sessions: u32,
    study_record: StudyRecord,
    quiz: Option<TestSession>,
    last_quiz: Option<QuizSettings>,
    deck: Option<FlashcardDeck>,
    sink: Arc<dyn ProgressSink>,
    rng: StdRng,
}

impl VocabEngine {
    pub fn new(
        config: EngineConfig,
        progress: ProgressData,
        study_record: StudyRecord,
        sink: Arc<dyn ProgressSink>,
    ) -> Self {
        let progress = progress.normalized();
        Self {
            config,
            mastery: MasteryStore::from_parts(progress.mastery, progress.weakness_list),
            recency: RecencyWindow::new(),
            history: progress.history,
            total_sessions: progress.total_sessions,
            study_record,
            quiz: None,
            last_quiz: None,
            deck: None,
            sink,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn snapshot(&self) -> ProgressData {
        ProgressData {
            total_sessions: self.total_sessions,
            mastery: self.mastery.records().clone(),
            weakness_list: self.mastery.weakness_list().to_vec(),
            history: self.history.clone(),
        }
    }

    fn persist_progress(&self) {
        if let Err(e) = self.sink.save_progress(&self.snapshot()) {
            tracing::warn!(error = %e, "Failed to persist progress");
        }
    }

    fn persist_study_record(&self) {
        if let Err(e) = self.sink.save_study_record(&self.study_record) {
            tracing::warn!(error = %e, "Failed to persist study record");
        }
    }

    pub fn record_outcome(&mut self, term: &str, is_correct: bool, now: DateTime<Utc>) -> MasteryRecord {
        let record = self.mastery.record_outcome(term, is_correct, now).clone();
        self.persist_progress();
        record
    }

    /// Weighted pick from `pool` without touching the recency window.
    pub fn select_words(&mut self, pool: &[WordItem], count: usize) -> Vec<WordItem> {
        selector::select_words(
            pool,
            count,
            &self.mastery,
            &self.recency,
            &self.config.selector,
            &mut self.rng,
        )
    }

    fn draw_session_words(&mut self, pool: &[WordItem], count: usize, may_reset: bool) -> Result<Vec<WordItem>, EngineError> {
        if may_reset && self.rng.gen_bool(self.config.recency_reset_probability) {
            tracing::debug!("Recency window reset before selection");
            self.recency.reset();
        }

        let words = self.select_words(pool, count);
        if words.is_empty() {
            return Err(EngineError::EmptySelection);
        }
        let terms: Vec<&str> = words.iter().map(|w| w.term.as_str()).collect();
        self.recency.record_selection(&terms);
        Ok(words)
    }

    fn complete_session(&mut self, result: &SessionResult) {
        self.history.push(result.clone());
        self.total_sessions += 1;
        self.study_record.record_session(result);
        self.persist_progress();
        self.persist_study_record();
        tracing::info!(
            kind = ?result.kind,
            score = result.score,
            total = result.total_questions,
            "Session completed"
        );
    }

    // ── Quiz ─────────────────────────────────────────────

    pub fn start_quiz(&mut self, pool: &[WordItem], settings: QuizSettings, now: DateTime<Utc>) -> Result<QuizStatus, EngineError> {
        self.begin_quiz(pool, settings, false, now)
    }

    /// Fixed-size term→translation quiz; may clear the recency window first.
    pub fn start_quick_test(&mut self, pool: &[WordItem], now: DateTime<Utc>) -> Result<QuizStatus, EngineError> {
        let settings = QuizSettings {
            question_type: QuestionType::TermToTranslation,
            count: self.config.quick_test_size,
            options: SessionOptions::default(),
        };
        self.begin_quiz(pool, settings, true, now)
    }

    /// Same settings as the last quiz, fresh words.
    pub fn retry_quiz(&mut self, pool: &[WordItem], now: DateTime<Utc>) -> Result<QuizStatus, EngineError> {
        let settings = self.last_quiz.ok_or(EngineError::NoActiveSession("quiz"))?;
        self.begin_quiz(pool, settings, false, now)
    }

    fn begin_quiz(
        &mut self,
        pool: &[WordItem],
        settings: QuizSettings,
        may_reset: bool,
        now: DateTime<Utc>,
    ) -> Result<QuizStatus, EngineError> {
        let words = self.draw_session_words(pool, settings.count, may_reset)?;

        let mut session = TestSession::new(uuid::Uuid::new_v4().to_string(), now);
        session.start(settings.question_type, words, settings.options, now)?;

        if let Some(previous) = self.quiz.replace(session) {
            if previous.phase() == SessionPhase::InProgress {
                tracing::info!(session_id = previous.id(), "Previous quiz abandoned by a new start");
            }
        }
        self.last_quiz = Some(settings);
        self.quiz_status(now)
    }

    fn quiz_mut(&mut self) -> Result<&mut TestSession, EngineError> {
        self.quiz.as_mut().ok_or(EngineError::NoActiveSession("quiz"))
    }

    /// Settings of the most recent quiz start, reused by `retry_quiz`.
    pub fn last_quiz_settings(&self) -> Option<QuizSettings> {
        self.last_quiz
    }

    pub fn quiz(&self) -> Option<&TestSession> {
        self.quiz.as_ref()
    }

    pub fn quiz_status(&self, now: DateTime<Utc>) -> Result<QuizStatus, EngineError> {
        let session = self.quiz.as_ref().ok_or(EngineError::NoActiveSession("quiz"))?;
        Ok(QuizStatus {
            id: session.id().to_string(),
            phase: session.phase(),
            question_type: session.question_type(),
            options: session.options(),
            current_index: session.current_index(),
            total: session.len(),
            answered: session.answered_count(),
            correct: session.correct_count(),
            timer_seconds: session.timer_elapsed_seconds(now),
            answers: session.answers().to_vec(),
            started_at: session.started_at(),
        })
    }

    /// The current question, built once per index so options stay stable.
    pub fn current_question(&mut self, corpus: &[WordItem]) -> Result<Question, EngineError> {
        let session = self.quiz.as_mut().ok_or(EngineError::NoActiveSession("quiz"))?;
        if let Some(question) = session.presented() {
            return Ok(question.clone());
        }

        let word = session.current_word()?.clone();
        let question = question::build_question(
            &word,
            session.current_index(),
            session.len(),
            session.question_type(),
            corpus,
            session.options().enable_sound,
            &mut self.rng,
        );
        session.set_presented(question.clone());
        Ok(question)
    }

    /// `elapsed_secs` defaults to the time since the question was shown.
    pub fn submit_answer(
        &mut self,
        input: AnswerInput,
        elapsed_secs: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<AnswerFeedback, EngineError> {
        let session = self.quiz.as_mut().ok_or(EngineError::NoActiveSession("quiz"))?;
        let word = session.current_word()?.clone();

        let is_correct = match input {
            AnswerInput::Verdict(v) => v,
            AnswerInput::Choice(index) => session
                .presented()
                .ok_or(EngineError::InvalidState {
                    operation: "submit_answer",
                    state: "waiting for the question to be presented",
                })?
                .is_correct(index)?,
        };
        let elapsed = elapsed_secs.unwrap_or_else(|| session.question_elapsed_seconds(now));

        let outcome = session.submit_answer(&mut self.mastery, is_correct, elapsed, now)?;
        let (record, already_answered) = match outcome {
            session::SubmitOutcome::Recorded(r) => (r, false),
            session::SubmitOutcome::AlreadyAnswered(r) => (r, true),
        };

        let options = session.options();
        let correct_answer = match session.presented() {
            Some(q) => q.correct_text().unwrap_or_default().to_string(),
            None => match session.question_type() {
                QuestionType::TranslationToTerm => word.term.clone(),
                QuestionType::PartOfSpeech => question::part_of_speech_label(&word.part_of_speech),
                _ => word.translation.clone(),
            },
        };
        let example = Some(word.example.trim().to_string()).filter(|e| !e.is_empty());
        let feedback = AnswerFeedback {
            is_correct: record.is_correct,
            already_answered,
            elapsed_seconds: record.elapsed_seconds,
            correct_answer,
            speech_cue: example
                .clone()
                .filter(|_| record.is_correct && options.enable_sound && options.show_examples),
            example: example.filter(|_| options.show_examples),
            idioms: Some(word.idioms.trim().to_string()).filter(|i| !i.is_empty() && options.show_examples),
            is_last_question: session.is_last_question(),
            term: word.term,
        };

        if !already_answered {
            self.persist_progress();
        }
        Ok(feedback)
    }

    /// A completed quiz stays in place, so further commands fail with
    /// `InvalidState` until the next start or an abandon.
    pub fn advance_quiz(&mut self, now: DateTime<Utc>) -> Result<Advance, EngineError> {
        let step = self.quiz_mut()?.advance(now)?;
        if let Advance::Completed(result) = &step {
            self.complete_session(result);
        }
        Ok(step)
    }

    /// Ends the running quiz before its last question and records the result.
    pub fn finish_quiz(&mut self, now: DateTime<Utc>) -> Result<SessionResult, EngineError> {
        let result = self.quiz_mut()?.finish(now)?;
        self.complete_session(&result);
        Ok(result)
    }

    /// Drops the quiz without recording anything. Returns whether it was still running.
    pub fn abandon_quiz(&mut self) -> bool {
        self.quiz
            .take()
            .is_some_and(|session| session.phase() == SessionPhase::InProgress)
    }

    // ── Flashcards ───────────────────────────────────────

    pub fn start_flashcards(
        &mut self,
        pool: &[WordItem],
        count: Option<usize>,
        direction: QuestionType,
        enable_sound: bool,
        now: DateTime<Utc>,
    ) -> Result<DeckStatus, EngineError> {
        let count = count.unwrap_or(self.config.default_flashcard_count);
        let words = self.draw_session_words(pool, count, false)?;
        let deck = FlashcardDeck::start(
            uuid::Uuid::new_v4().to_string(),
            direction,
            words,
            enable_sound,
            now,
            &mut self.rng,
        )?;

        if let Some(previous) = self.deck.replace(deck) {
            tracing::info!(deck_id = previous.id(), "Previous flashcard deck abandoned by a new start");
        }
        self.deck_status(now)
    }

    pub fn deck(&self) -> Option<&FlashcardDeck> {
        self.deck.as_ref()
    }

    pub fn deck_status(&self, now: DateTime<Utc>) -> Result<DeckStatus, EngineError> {
        let deck = self.deck.as_ref().ok_or(EngineError::NoActiveSession("flashcard"))?;
        Ok(DeckStatus {
            id: deck.id().to_string(),
            phase: deck.phase(),
            direction: deck.direction(),
            current_index: deck.current_index(),
            total: deck.len(),
            known: deck.known_count(),
            unknown: deck.unknown_count(),
            elapsed_seconds: (now - deck.started_at()).num_seconds().max(0) as u64,
            started_at: deck.started_at(),
        })
    }

    pub fn current_card(&self) -> Result<Card, EngineError> {
        self.deck
            .as_ref()
            .ok_or(EngineError::NoActiveSession("flashcard"))?
            .current_card()
    }

    fn deck_mut(&mut self) -> Result<&mut FlashcardDeck, EngineError> {
        self.deck.as_mut().ok_or(EngineError::NoActiveSession("flashcard"))
    }

    pub fn mark_card(&mut self, known: bool, now: DateTime<Utc>) -> Result<DeckStep, EngineError> {
        let deck = self.deck.as_mut().ok_or(EngineError::NoActiveSession("flashcard"))?;
        let first_mark = deck.current_mark() == Some(CardMark::Unmarked);
        let step = deck.mark(&mut self.mastery, known, now)?;
        if let DeckStep::Finished(result) = &step {
            self.deck = None;
            self.complete_session(result);
        } else if first_mark {
            self.persist_progress();
        }
        Ok(step)
    }

    pub fn next_card(&mut self, now: DateTime<Utc>) -> Result<DeckStep, EngineError> {
        let step = self.deck_mut()?.next(now)?;
        if let DeckStep::Finished(result) = &step {
            self.deck = None;
            self.complete_session(result);
        }
        Ok(step)
    }

    pub fn previous_card(&mut self, now: DateTime<Utc>) -> Result<usize, EngineError> {
        self.deck_mut()?.previous(now)
    }

    pub fn finish_flashcards(&mut self, now: DateTime<Utc>) -> Result<SessionResult, EngineError> {
        let result = self.deck_mut()?.finish(now)?;
        self.deck = None;
        self.complete_session(&result);
        Ok(result)
    }

    pub fn abandon_flashcards(&mut self) -> bool {
        self.deck.take().is_some()
    }

    /// Abandons sessions whose last activity is older than the idle timeout.
    pub fn abandon_idle_sessions(&mut self, now: DateTime<Utc>) -> IdleSweep {
        let cutoff = now - Duration::minutes(self.config.session_idle_timeout_mins);
        let mut sweep = IdleSweep::default();

        if self.quiz.as_ref().is_some_and(|s| s.last_activity_at() < cutoff) {
            sweep.quiz = self.abandon_quiz();
        }
        if self.deck.as_ref().is_some_and(|d| d.last_activity_at() < cutoff) {
            sweep.flashcards = self.abandon_flashcards();
        }
        sweep
    }

    // ── Reporting ────────────────────────────────────────

    pub fn summary(&self) -> reporting::ProgressSummary {
        reporting::progress_summary(&self.mastery, &self.history, self.total_sessions)
    }

    pub fn mastery_table(&self, corpus: &[WordItem]) -> Vec<reporting::MasteryRow> {
        reporting::mastery_table(&self.mastery, corpus)
    }

    /// Weakest practised words first, capped at `limit`.
    pub fn review_list(&self, corpus: &[WordItem], limit: usize) -> Vec<reporting::MasteryRow> {
        let mut rows = self.mastery_table(corpus);
        rows.truncate(limit);
        rows
    }

    pub fn history_stats(&self) -> reporting::HistoryStats {
        reporting::history_stats(&self.history)
    }

    pub fn daily_performance(&self) -> Vec<reporting::DailyPerformance> {
        reporting::daily_performance(&self.history)
    }

    pub fn month_view(&self, year: i32, month: u32, today: NaiveDate) -> Option<study_record::MonthView> {
        self.study_record.month(year, month, today)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn mastery(&self) -> &MasteryStore {
        &self.mastery
    }

    pub fn recency(&self) -> &RecencyWindow {
        &self.recency
    }

    pub fn history(&self) -> &[SessionResult] {
        &self.history
    }

    pub fn total_sessions(&self) -> u32 {
        self.total_sessions
    }

    pub fn study_record(&self) -> &StudyRecord {
        &self.study_record
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    fn settings(count: usize) -> QuizSettings {
        QuizSettings {
            question_type: QuestionType::TermToTranslation,
            count,
            options: SessionOptions {
                timer_enabled: false,
                ..SessionOptions::default()
            },
        }
    }

    #[test]
    fn answer_is_persisted_immediately() {
        let sink = Arc::new(MemorySink::default());
        let mut engine = engine_with(sink.clone(), 1);
        let now = Utc::now();
        let corpus = words(6);

        engine.start_quiz(&corpus, settings(3), now).unwrap();
        engine.current_question(&corpus).unwrap();
        engine.submit_answer(AnswerInput::Verdict(false), Some(4), now).unwrap();

        let saved = sink.progress.lock().unwrap().clone().unwrap();
        assert_eq!(saved.mastery.len(), 1);
        assert_eq!(saved.weakness_list.len(), 1);
    }

    #[test]
    fn choice_answer_is_graded_against_presented_options() {
        let sink = Arc::new(MemorySink::default());
        let mut engine = engine_with(sink, 2);
        let now = Utc::now();
        let corpus = words(6);

        engine.start_quiz(&corpus, settings(2), now).unwrap();
        let question = engine.current_question(&corpus).unwrap();
        let again = engine.current_question(&corpus).unwrap();
        assert_eq!(question, again);

        let right = question.options.iter().position(|o| o.correct).unwrap();
        let feedback = engine.submit_answer(AnswerInput::Choice(right), Some(3), now).unwrap();
        assert!(feedback.is_correct);
        assert_eq!(feedback.correct_answer, question.correct_text().unwrap());

        let dup = engine.submit_answer(AnswerInput::Choice((right + 1) % 4), Some(3), now).unwrap();
        assert!(dup.already_answered);
        assert!(dup.is_correct);
    }

    #[test]
    fn choice_without_presented_question_is_rejected() {
        let sink = Arc::new(MemorySink::default());
        let mut engine = engine_with(sink, 3);
        let now = Utc::now();
        engine.start_quiz(&words(3), settings(3), now).unwrap();
        assert!(matches!(
            engine.submit_answer(AnswerInput::Choice(0), None, now),
            Err(EngineError::InvalidState { .. })
        ));
    }

    #[test]
    fn completed_quiz_lands_in_history_and_calendar() {
        let sink = Arc::new(MemorySink::default());
        let mut engine = engine_with(sink.clone(), 4);
        let now = Utc::now();
        let corpus = words(5);

        engine.start_quiz(&corpus, settings(2), now).unwrap();
        engine.submit_answer(AnswerInput::Verdict(true), Some(5), now).unwrap();
        engine.advance_quiz(now).unwrap();
        engine.submit_answer(AnswerInput::Verdict(true), Some(5), now).unwrap();
        let step = engine.advance_quiz(now).unwrap();

        assert!(matches!(step, Advance::Completed(ref r) if r.score == 100));
        assert_eq!(engine.quiz().unwrap().phase(), SessionPhase::Completed);
        assert_eq!(engine.total_sessions(), 1);
        assert_eq!(engine.history().len(), 1);
        assert_eq!(engine.study_record().total_days, 1);
        assert!(sink.study_record.lock().unwrap().is_some());
    }

    #[test]
    fn commands_after_completion_are_invalid_state() {
        let sink = Arc::new(MemorySink::default());
        let mut engine = engine_with(sink, 12);
        let now = Utc::now();
        let corpus = words(3);

        engine.start_quiz(&corpus, settings(1), now).unwrap();
        engine.submit_answer(AnswerInput::Verdict(true), Some(2), now).unwrap();
        engine.advance_quiz(now).unwrap();

        assert!(matches!(
            engine.advance_quiz(now),
            Err(EngineError::InvalidState { operation: "advance", state: "completed" })
        ));
        assert!(matches!(
            engine.submit_answer(AnswerInput::Verdict(false), Some(2), now),
            Err(EngineError::InvalidState { state: "completed", .. })
        ));
        assert!(matches!(
            engine.current_question(&corpus),
            Err(EngineError::InvalidState { .. })
        ));
        assert!(matches!(engine.finish_quiz(now), Err(EngineError::InvalidState { .. })));
        assert_eq!(engine.total_sessions(), 1);

        assert!(!engine.abandon_quiz());
        assert_eq!(engine.advance_quiz(now), Err(EngineError::NoActiveSession("quiz")));
    }

    #[test]
    fn early_finish_records_partial_quiz() {
        let sink = Arc::new(MemorySink::default());
        let mut engine = engine_with(sink.clone(), 13);
        let now = Utc::now();

        engine.start_quiz(&words(8), settings(4), now).unwrap();
        engine.submit_answer(AnswerInput::Verdict(true), Some(6), now).unwrap();
        let result = engine.finish_quiz(now).unwrap();

        assert_eq!(result.total_questions, 4);
        assert_eq!(result.score, 25);
        assert!((result.avg_answer_time - 6.0).abs() < 1e-9);
        assert_eq!(engine.history().len(), 1);
        assert_eq!(engine.study_record().total_days, 1);
        assert!(sink.study_record.lock().unwrap().is_some());
        assert_eq!(engine.quiz_status(now).unwrap().phase, SessionPhase::Completed);
    }

    #[test]
    fn correct_answer_cues_the_example() {
        let sink = Arc::new(MemorySink::default());
        let mut engine = engine_with(sink, 14);
        let now = Utc::now();
        let corpus: Vec<WordItem> = words(4)
            .into_iter()
            .map(|mut w| {
                w.example = format!("An example with {}.", w.term);
                w
            })
            .collect();

        let cue_settings = QuizSettings {
            options: SessionOptions::default(),
            ..settings(2)
        };
        engine.start_quiz(&corpus, cue_settings, now).unwrap();
        let right = engine.submit_answer(AnswerInput::Verdict(true), Some(3), now).unwrap();
        assert!(right.speech_cue.is_some());
        assert_eq!(right.speech_cue, right.example);

        engine.advance_quiz(now).unwrap();
        let wrong = engine.submit_answer(AnswerInput::Verdict(false), Some(3), now).unwrap();
        assert!(wrong.speech_cue.is_none());
        assert!(wrong.example.is_some());
    }

    #[test]
    fn empty_pool_fails_without_creating_a_session() {
        let sink = Arc::new(MemorySink::default());
        let mut engine = engine_with(sink, 5);
        assert_eq!(
            engine.start_quiz(&[], settings(5), Utc::now()),
            Err(EngineError::EmptySelection)
        );
        assert!(engine.quiz().is_none());
        assert!(engine.recency().is_empty());
    }

    #[test]
    fn selection_is_recorded_in_recency_window() {
        let sink = Arc::new(MemorySink::default());
        let mut engine = engine_with(sink, 6);
        let status = engine.start_quiz(&words(20), settings(4), Utc::now()).unwrap();
        assert_eq!(status.total, 4);
        assert_eq!(engine.recency().len(), 4);
        for word in engine.quiz().unwrap().words() {
            assert!(engine.recency().is_recent(&word.term));
        }
    }

    #[test]
    fn retry_reuses_last_settings() {
        let sink = Arc::new(MemorySink::default());
        let mut engine = engine_with(sink, 7);
        let now = Utc::now();
        assert_eq!(
            engine.retry_quiz(&words(5), now),
            Err(EngineError::NoActiveSession("quiz"))
        );

        engine.start_quiz(&words(10), settings(3), now).unwrap();
        engine.abandon_quiz();
        let status = engine.retry_quiz(&words(10), now).unwrap();
        assert_eq!(status.total, 3);
        assert!(!status.options.timer_enabled);
    }

    #[test]
    fn quick_test_uses_configured_size() {
        let sink = Arc::new(MemorySink::default());
        let mut engine = engine_with(sink, 8);
        let status = engine.start_quick_test(&words(30), Utc::now()).unwrap();
        assert_eq!(status.total, 10);
        assert_eq!(status.question_type, QuestionType::TermToTranslation);
    }

    fn quick_config(reset_probability: f64) -> EngineConfig {
        EngineConfig {
            recency_reset_probability: reset_probability,
            quick_test_size: 3,
            ..EngineConfig::default()
        }
    }

    #[test]
    fn quick_test_clears_recency_window_when_reset_fires() {
        let sink = Arc::new(MemorySink::default());
        let mut engine = engine_with_config(sink, 15, quick_config(1.0));
        let now = Utc::now();

        engine.start_quiz(&words(20), settings(4), now).unwrap();
        assert_eq!(engine.recency().len(), 4);

        engine.start_quick_test(&words(20), now).unwrap();
        assert_eq!(engine.recency().len(), 3);
        let quick_terms: Vec<&str> = engine.quiz().unwrap().words().iter().map(|w| w.term.as_str()).collect();
        assert_eq!(engine.recency().terms().collect::<Vec<_>>(), quick_terms);
    }

    #[test]
    fn recency_window_survives_without_reset() {
        let sink = Arc::new(MemorySink::default());
        let mut engine = engine_with_config(sink, 16, quick_config(0.0));
        let now = Utc::now();

        engine.start_quiz(&words(20), settings(4), now).unwrap();
        engine.start_quick_test(&words(20), now).unwrap();
        assert_eq!(engine.recency().len(), 7);

        // Only quick tests may reset; regular quizzes and decks keep the window.
        let mut engine = engine_with_config(Arc::new(MemorySink::default()), 17, quick_config(1.0));
        engine.start_quiz(&words(20), settings(4), now).unwrap();
        engine.start_quiz(&words(20), settings(2), now).unwrap();
        engine
            .start_flashcards(&words(20), Some(2), QuestionType::TermToTranslation, false, now)
            .unwrap();
        assert_eq!(engine.recency().len(), 8);
    }

    #[test]
    fn flashcard_run_completes_into_history() {
        let sink = Arc::new(MemorySink::default());
        let mut engine = engine_with(sink, 9);
        let now = Utc::now();

        engine
            .start_flashcards(&words(2), None, QuestionType::TermToTranslation, false, now)
            .unwrap();
        engine.mark_card(true, now).unwrap();
        let step = engine.mark_card(false, now).unwrap();

        let DeckStep::Finished(result) = step else {
            panic!("expected finish");
        };
        assert_eq!(result.kind, SessionKind::Flashcard);
        assert_eq!(result.score, 50);
        assert!(engine.deck().is_none());
        assert_eq!(engine.history().len(), 1);
        assert_eq!(engine.mastery().len(), 2);
    }

    #[test]
    fn idle_sessions_are_abandoned() {
        let sink = Arc::new(MemorySink::default());
        let mut engine = engine_with(sink, 10);
        let start = Utc::now();
        engine.start_quiz(&words(3), settings(3), start).unwrap();
        engine
            .start_flashcards(&words(3), Some(2), QuestionType::Mixed, false, start + Duration::minutes(100))
            .unwrap();

        let sweep = engine.abandon_idle_sessions(start + Duration::minutes(150));
        assert!(sweep.quiz);
        assert!(!sweep.flashcards);
        assert!(engine.quiz().is_none());
        assert!(engine.deck().is_some());
        assert!(engine.history().is_empty());
    }

    #[test]
    fn failing_sink_does_not_block_engine() {
        let sink = Arc::new(MemorySink {
            fail: true,
            ..MemorySink::default()
        });
        let mut engine = engine_with(sink.clone(), 11);
        let now = Utc::now();

        engine.start_quiz(&words(2), settings(1), now).unwrap();
        engine.submit_answer(AnswerInput::Verdict(true), Some(2), now).unwrap();
        engine.advance_quiz(now).unwrap();

        assert_eq!(engine.total_sessions(), 1);
        assert!(*sink.saves.lock().unwrap() >= 2);
    }
}
