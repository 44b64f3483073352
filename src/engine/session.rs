use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::mastery::MasteryStore;
use crate::engine::question::Question;
use crate::engine::reporting::mean_answer_time;
use crate::engine::types::{EngineError, QuestionType, SessionResult, WordItem};

/// Exclusive upper bound of a plausible answer time.
pub const ANSWER_TIME_CEILING_SECS: i64 = 1800;
/// Stored in place of an implausible answer time.
pub const ANSWER_TIME_PLACEHOLDER_SECS: u32 = 30;

pub fn normalize_answer_time(elapsed_secs: i64) -> u32 {
    if (0..ANSWER_TIME_CEILING_SECS).contains(&elapsed_secs) {
        elapsed_secs as u32
    } else {
        ANSWER_TIME_PLACEHOLDER_SECS
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    NotStarted,
    InProgress,
    Completed,
}

impl SessionPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    pub is_correct: bool,
    pub elapsed_seconds: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QuestionState {
    Unanswered,
    Answered(AnswerRecord),
}

impl QuestionState {
    pub fn answer(&self) -> Option<&AnswerRecord> {
        match self {
            Self::Answered(record) => Some(record),
            Self::Unanswered => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionOptions {
    pub timer_enabled: bool,
    pub show_examples: bool,
    pub enable_sound: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            timer_enabled: true,
            show_examples: true,
            enable_sound: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Recorded(AnswerRecord),
    /// The current question already had an answer; nothing changed.
    AlreadyAnswered(AnswerRecord),
}

impl SubmitOutcome {
    pub fn record(&self) -> AnswerRecord {
        match self {
            Self::Recorded(r) | Self::AlreadyAnswered(r) => *r,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    Next { index: usize },
    Completed(SessionResult),
}

/// A quiz run over a fixed word list.
#[derive(Debug, Clone)]
pub struct TestSession {
    id: String,
    question_type: QuestionType,
    options: SessionOptions,
    words: Vec<WordItem>,
    current_index: usize,
    answers: Vec<QuestionState>,
    phase: SessionPhase,
    started_at: Option<DateTime<Utc>>,
    question_started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    last_activity_at: DateTime<Utc>,
    presented: Option<Question>,
}

impl TestSession {
    pub fn new(id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            question_type: QuestionType::default(),
            options: SessionOptions::default(),
            words: Vec::new(),
            current_index: 0,
            answers: Vec::new(),
            phase: SessionPhase::NotStarted,
            started_at: None,
            question_started_at: None,
            completed_at: None,
            last_activity_at: now,
            presented: None,
        }
    }

    pub fn start(
        &mut self,
        question_type: QuestionType,
        words: Vec<WordItem>,
        options: SessionOptions,
        now: DateTime<Utc>,
    ) -> Result<(), EngineError> {
        self.require(SessionPhase::NotStarted, "start")?;
        if words.is_empty() {
            return Err(EngineError::EmptySelection);
        }

        self.question_type = question_type;
        self.options = options;
        self.answers = vec![QuestionState::Unanswered; words.len()];
        self.words = words;
        self.current_index = 0;
        self.phase = SessionPhase::InProgress;
        self.started_at = Some(now);
        self.question_started_at = Some(now);
        self.last_activity_at = now;
        Ok(())
    }

    pub fn current_word(&self) -> Result<&WordItem, EngineError> {
        self.require(SessionPhase::InProgress, "current_word")?;
        self.words.get(self.current_index).ok_or(EngineError::InvalidState {
            operation: "current_word",
            state: "past the last question",
        })
    }

    /// Records the answer for the current question and reports the outcome to
    /// `mastery`. A second call for the same question changes nothing.
    pub fn submit_answer(
        &mut self,
        mastery: &mut MasteryStore,
        is_correct: bool,
        elapsed_secs: i64,
        now: DateTime<Utc>,
    ) -> Result<SubmitOutcome, EngineError> {
        self.require(SessionPhase::InProgress, "submit_answer")?;

        let index = self.current_index;
        if let QuestionState::Answered(existing) = self.answers[index] {
            return Ok(SubmitOutcome::AlreadyAnswered(existing));
        }

        let record = AnswerRecord {
            is_correct,
            elapsed_seconds: normalize_answer_time(elapsed_secs),
        };
        self.answers[index] = QuestionState::Answered(record);
        mastery.record_outcome(&self.words[index].term, is_correct, now);
        self.last_activity_at = now;
        Ok(SubmitOutcome::Recorded(record))
    }

    /// Moves to the next question, or completes the session after the last one.
    ///
    /// Advancing past an unanswered question is allowed; it counts as neither
    /// correct nor timed.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Result<Advance, EngineError> {
        self.require(SessionPhase::InProgress, "advance")?;
        self.last_activity_at = now;
        self.presented = None;

        if self.current_index + 1 < self.words.len() {
            self.current_index += 1;
            self.question_started_at = Some(now);
            return Ok(Advance::Next {
                index: self.current_index,
            });
        }

        Ok(Advance::Completed(self.complete(now)))
    }

    /// Ends the quiz early. Unreached questions count as wrong, so the score
    /// is taken over the full word list.
    pub fn finish(&mut self, now: DateTime<Utc>) -> Result<SessionResult, EngineError> {
        self.require(SessionPhase::InProgress, "finish")?;
        self.last_activity_at = now;
        self.presented = None;
        Ok(self.complete(now))
    }

    fn complete(&mut self, now: DateTime<Utc>) -> SessionResult {
        self.phase = SessionPhase::Completed;
        self.completed_at = Some(now);
        self.question_started_at = None;
        self.build_result(now)
    }

    fn build_result(&self, now: DateTime<Utc>) -> SessionResult {
        let total = self.words.len() as u32;
        let correct = self.correct_count() as u32;
        let score = if total == 0 {
            0
        } else {
            (correct as f64 / total as f64 * 100.0).round() as u32
        };
        let question_times: Vec<u32> = self
            .answers
            .iter()
            .filter_map(|a| a.answer().map(|r| r.elapsed_seconds))
            .collect();

        SessionResult {
            date: now,
            kind: self.question_type.into(),
            total_questions: total,
            correct_answers: correct,
            score,
            time_seconds: self.timer_elapsed_seconds(now),
            avg_answer_time: mean_answer_time(&question_times),
            question_times,
        }
    }

    /// Whole seconds on the session timer; `0` when the timer is disabled.
    pub fn timer_elapsed_seconds(&self, now: DateTime<Utc>) -> u64 {
        if !self.options.timer_enabled {
            return 0;
        }
        let Some(started) = self.started_at else {
            return 0;
        };
        let end = self.completed_at.unwrap_or(now);
        (end - started).num_seconds().max(0) as u64
    }

    /// Seconds since the current question was shown, rounded to the nearest second.
    pub fn question_elapsed_seconds(&self, now: DateTime<Utc>) -> i64 {
        match self.question_started_at {
            Some(started) => ((now - started).num_milliseconds() as f64 / 1000.0).round() as i64,
            None => 0,
        }
    }

    pub fn correct_count(&self) -> usize {
        self.answers
            .iter()
            .filter(|a| matches!(a, QuestionState::Answered(r) if r.is_correct))
            .count()
    }

    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|a| a.answer().is_some()).count()
    }

    pub fn is_current_answered(&self) -> bool {
        self.answers
            .get(self.current_index)
            .is_some_and(|a| a.answer().is_some())
    }

    pub fn is_last_question(&self) -> bool {
        self.current_index + 1 >= self.words.len()
    }

    pub fn presented(&self) -> Option<&Question> {
        self.presented
            .as_ref()
            .filter(|q| q.index == self.current_index)
    }

    pub fn set_presented(&mut self, question: Question) {
        self.presented = Some(question);
    }

    fn require(&self, phase: SessionPhase, operation: &'static str) -> Result<(), EngineError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(EngineError::InvalidState {
                operation,
                state: self.phase.as_str(),
            })
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn question_type(&self) -> QuestionType {
        self.question_type
    }

    pub fn options(&self) -> SessionOptions {
        self.options
    }

    pub fn words(&self) -> &[WordItem] {
        &self.words
    }

    pub fn answers(&self) -> &[QuestionState] {
        &self.answers
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

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn last_activity_at(&self) -> DateTime<Utc> {
        self.last_activity_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn words(terms: &[&str]) -> Vec<WordItem> {
        terms.iter().map(|t| WordItem::new(t, "n", t)).collect()
    }

    fn started(terms: &[&str], timer: bool) -> (TestSession, DateTime<Utc>) {
        let now = Utc::now();
        let mut session = TestSession::new("s1", now);
        let options = SessionOptions {
            timer_enabled: timer,
            ..SessionOptions::default()
        };
        session
            .start(QuestionType::TermToTranslation, words(terms), options, now)
            .unwrap();
        (session, now)
    }

    #[test]
    fn three_question_run_scores_and_averages() {
        let (mut session, now) = started(&["A", "B", "C"], false);
        let mut mastery = MasteryStore::new();

        session.submit_answer(&mut mastery, true, 5, now).unwrap();
        session.advance(now).unwrap();
        session.submit_answer(&mut mastery, false, 10, now).unwrap();
        session.advance(now).unwrap();
        session.submit_answer(&mut mastery, true, 7, now).unwrap();
        let Advance::Completed(result) = session.advance(now).unwrap() else {
            panic!("expected completion");
        };

        assert_eq!(session.phase(), SessionPhase::Completed);
        assert_eq!(result.score, 67);
        assert_eq!(result.correct_answers, 2);
        assert_eq!(result.total_questions, 3);
        assert!((result.avg_answer_time - 7.3).abs() < 1e-9);
        assert_eq!(result.question_times, vec![5, 10, 7]);
        assert_eq!(result.time_seconds, 0);
        assert_eq!(mastery.get("B").unwrap().correct, 0);
    }

    #[test]
    fn double_submit_is_a_no_op() {
        let (mut session, now) = started(&["A", "B"], true);
        let mut mastery = MasteryStore::new();

        let first = session.submit_answer(&mut mastery, true, 4, now).unwrap();
        let snapshot = mastery.clone();
        let second = session.submit_answer(&mut mastery, false, 9, now).unwrap();

        assert!(matches!(first, SubmitOutcome::Recorded(_)));
        assert_eq!(second, SubmitOutcome::AlreadyAnswered(first.record()));
        assert_eq!(mastery, snapshot);
    }

    #[test]
    fn outlier_answer_time_is_replaced() {
        let (mut session, now) = started(&["A", "B", "C"], false);
        let mut mastery = MasteryStore::new();

        let r = session.submit_answer(&mut mastery, true, 5000, now).unwrap();
        assert_eq!(r.record().elapsed_seconds, ANSWER_TIME_PLACEHOLDER_SECS);
        session.advance(now).unwrap();
        let r = session.submit_answer(&mut mastery, true, -3, now).unwrap();
        assert_eq!(r.record().elapsed_seconds, ANSWER_TIME_PLACEHOLDER_SECS);
    }

    #[test]
    fn operations_outside_in_progress_are_rejected() {
        let now = Utc::now();
        let mut mastery = MasteryStore::new();
        let mut fresh = TestSession::new("s", now);
        assert!(matches!(
            fresh.submit_answer(&mut mastery, true, 1, now),
            Err(EngineError::InvalidState { state: "not_started", .. })
        ));
        assert!(fresh.advance(now).is_err());

        let (mut session, now) = started(&["A"], false);
        session.advance(now).unwrap();
        assert!(matches!(
            session.advance(now),
            Err(EngineError::InvalidState { operation: "advance", state: "completed" })
        ));
        assert!(session.submit_answer(&mut mastery, true, 1, now).is_err());
        assert!(mastery.is_empty());
    }

    #[test]
    fn start_requires_words_and_happens_once() {
        let now = Utc::now();
        let mut session = TestSession::new("s", now);
        assert_eq!(
            session.start(QuestionType::Mixed, Vec::new(), SessionOptions::default(), now),
            Err(EngineError::EmptySelection)
        );
        assert_eq!(session.phase(), SessionPhase::NotStarted);

        session
            .start(QuestionType::Mixed, words(&["A"]), SessionOptions::default(), now)
            .unwrap();
        assert!(session
            .start(QuestionType::Mixed, words(&["B"]), SessionOptions::default(), now)
            .is_err());
    }

    #[test]
    fn skipped_question_counts_as_wrong_without_time() {
        let (mut session, now) = started(&["A", "B"], false);
        let mut mastery = MasteryStore::new();
        session.advance(now).unwrap();
        session.submit_answer(&mut mastery, true, 6, now).unwrap();
        let Advance::Completed(result) = session.advance(now).unwrap() else {
            panic!("expected completion");
        };
        assert_eq!(result.score, 50);
        assert_eq!(result.question_times, vec![6]);
        assert!(mastery.get("A").is_none());
    }

    #[test]
    fn early_finish_scores_over_all_words() {
        let (mut session, now) = started(&["A", "B", "C", "D"], false);
        let mut mastery = MasteryStore::new();

        session.submit_answer(&mut mastery, true, 4, now).unwrap();
        session.advance(now).unwrap();
        session.submit_answer(&mut mastery, true, 8, now).unwrap();
        let result = session.finish(now).unwrap();

        assert_eq!(session.phase(), SessionPhase::Completed);
        assert_eq!(result.total_questions, 4);
        assert_eq!(result.correct_answers, 2);
        assert_eq!(result.score, 50);
        assert_eq!(result.question_times, vec![4, 8]);
        assert!((result.avg_answer_time - 6.0).abs() < 1e-9);
        assert!(matches!(
            session.finish(now),
            Err(EngineError::InvalidState { operation: "finish", state: "completed" })
        ));
        assert!(session.advance(now).is_err());
    }

    #[test]
    fn timer_measures_wall_clock_when_enabled() {
        let (mut session, start) = started(&["A"], true);
        let later = start + Duration::seconds(42);
        assert_eq!(session.timer_elapsed_seconds(later), 42);
        assert_eq!(session.question_elapsed_seconds(start + Duration::milliseconds(2600)), 3);

        let Advance::Completed(result) = session.advance(later).unwrap() else {
            panic!("expected completion");
        };
        assert_eq!(result.time_seconds, 42);
        assert_eq!(session.timer_elapsed_seconds(later + Duration::seconds(100)), 42);
    }
}
