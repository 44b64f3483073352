//! Read-side folds over the mastery store and the session history.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::engine::mastery::{MasteryRecord, MasteryStore};
use crate::engine::session::ANSWER_TIME_CEILING_SECS;
use crate::engine::types::{SessionResult, WordItem};

pub const MASTERED_MIN_ATTEMPTS: u32 = 3;
pub const TREND_WINDOW: usize = 5;
pub const TREND_BAND: f64 = 5.0;

pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Mean of per-question times below the ceiling, one decimal; `0` with no samples.
pub fn mean_answer_time(times: &[u32]) -> f64 {
    let valid: Vec<f64> = times
        .iter()
        .filter(|t| i64::from(**t) < ANSWER_TIME_CEILING_SECS)
        .map(|t| f64::from(*t))
        .collect();
    if valid.is_empty() {
        return 0.0;
    }
    round_to_tenth(valid.iter().sum::<f64>() / valid.len() as f64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MasteryTier {
    Low,
    Medium,
    High,
}

impl MasteryTier {
    pub fn for_accuracy(accuracy: f64) -> Self {
        if accuracy >= 0.8 {
            Self::High
        } else if accuracy >= 0.5 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// `None` until the term has at least one attempt.
pub fn mastery_tier(store: &MasteryStore, term: &str) -> Option<MasteryTier> {
    store
        .get(term)
        .filter(|r| r.attempts > 0)
        .map(|r| MasteryTier::for_accuracy(r.accuracy()))
}

pub fn is_mastered(record: &MasteryRecord) -> bool {
    record.attempts >= MASTERED_MIN_ATTEMPTS && record.accuracy() >= 0.8
}

/// Higher is weaker. Recent outcomes count twice as much as the long run.
pub fn weakness_score(record: &MasteryRecord) -> f64 {
    let accuracy = record.accuracy() * 100.0;
    if record.recent_outcomes.is_empty() {
        100.0 - accuracy
    } else {
        100.0 - (2.0 * record.recent_accuracy() * 100.0 + accuracy) / 3.0
    }
}

pub fn weakness_score_for(store: &MasteryStore, term: &str) -> f64 {
    match store.get(term) {
        Some(record) => weakness_score(record),
        None => weakness_score(&MasteryRecord::default()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaknessBand {
    Low,
    Medium,
    High,
}

impl WeaknessBand {
    pub fn for_score(score: f64) -> Self {
        if score > 70.0 {
            Self::High
        } else if score > 40.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    pub total_sessions: u32,
    pub learned_words: usize,
    pub mastered_words: usize,
    pub average_score: u32,
    pub weakness_count: usize,
}

pub fn progress_summary(store: &MasteryStore, history: &[SessionResult], total_sessions: u32) -> ProgressSummary {
    let score_sum: u64 = history.iter().map(|r| u64::from(r.score)).sum();
    let average_score = if total_sessions > 0 {
        (score_sum as f64 / f64::from(total_sessions)).round() as u32
    } else {
        0
    };

    ProgressSummary {
        total_sessions,
        learned_words: store.len(),
        mastered_words: store.records().values().filter(|r| is_mastered(r)).count(),
        average_score,
        weakness_count: store.weakness_list().len(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryRow {
    pub term: String,
    pub part_of_speech: String,
    pub translation: String,
    pub attempts: u32,
    pub correct: u32,
    pub accuracy_percent: u32,
    pub recent_accuracy_percent: u32,
    pub tier: MasteryTier,
    pub recent_tier: MasteryTier,
    pub recent_outcomes: Vec<bool>,
    pub weakness_score: f64,
    pub weakness_band: WeaknessBand,
    pub mastered: bool,
}

/// One row per practised term that still exists in `corpus`, weakest first.
pub fn mastery_table(store: &MasteryStore, corpus: &[WordItem]) -> Vec<MasteryRow> {
    let by_term: HashMap<&str, &WordItem> = corpus.iter().map(|w| (w.term.as_str(), w)).collect();

    let mut rows: Vec<MasteryRow> = store
        .records()
        .iter()
        .filter(|(_, record)| record.attempts > 0)
        .filter_map(|(term, record)| {
            let word = by_term.get(term.as_str())?;
            let accuracy = record.accuracy();
            let recent_accuracy = record.recent_accuracy();
            let score = round_to_tenth(weakness_score(record));
            Some(MasteryRow {
                term: term.clone(),
                part_of_speech: word.part_of_speech.clone(),
                translation: word.translation.clone(),
                attempts: record.attempts,
                correct: record.correct,
                accuracy_percent: (accuracy * 100.0).round() as u32,
                recent_accuracy_percent: (recent_accuracy * 100.0).round() as u32,
                tier: MasteryTier::for_accuracy(accuracy),
                recent_tier: MasteryTier::for_accuracy(recent_accuracy),
                recent_outcomes: record.recent_outcomes.clone(),
                weakness_score: score,
                weakness_band: WeaknessBand::for_score(score),
                mastered: is_mastered(record),
            })
        })
        .collect();

    rows.sort_by(|a, b| {
        b.weakness_score
            .total_cmp(&a.weakness_score)
            .then_with(|| a.term.cmp(&b.term))
    });
    rows
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Rising,
    Falling,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendReport {
    pub recent_average: f64,
    pub previous_average: f64,
    pub delta: f64,
    pub trend: Trend,
}

/// Last five sessions against the five before them; `None` below ten sessions.
pub fn score_trend(history: &[SessionResult]) -> Option<TrendReport> {
    if history.len() < TREND_WINDOW * 2 {
        return None;
    }
    let n = history.len();
    let mean = |slice: &[SessionResult]| slice.iter().map(|r| f64::from(r.score)).sum::<f64>() / slice.len() as f64;

    let recent_average = mean(&history[n - TREND_WINDOW..]);
    let previous_average = mean(&history[n - 2 * TREND_WINDOW..n - TREND_WINDOW]);
    let delta = recent_average - previous_average;
    let trend = if delta > TREND_BAND {
        Trend::Rising
    } else if delta < -TREND_BAND {
        Trend::Falling
    } else {
        Trend::Stable
    };

    Some(TrendReport {
        recent_average,
        previous_average,
        delta,
        trend,
    })
}

/// Average answer time weighted by question count, skipping implausible averages.
pub fn weighted_answer_time(history: &[SessionResult]) -> f64 {
    let ceiling = ANSWER_TIME_CEILING_SECS as f64;
    let (weighted, questions) = history
        .iter()
        .filter(|r| r.avg_answer_time >= 0.0 && r.avg_answer_time < ceiling)
        .fold((0.0, 0u64), |(sum, n), r| {
            (sum + r.avg_answer_time * f64::from(r.total_questions), n + u64::from(r.total_questions))
        });
    if questions == 0 {
        0.0
    } else {
        weighted / questions as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStats {
    pub session_count: usize,
    pub first_session_at: Option<DateTime<Utc>>,
    pub study_days: usize,
    pub average_score: f64,
    pub average_answer_time: f64,
    pub trend: Option<TrendReport>,
}

pub fn history_stats(history: &[SessionResult]) -> HistoryStats {
    let days: BTreeSet<NaiveDate> = history.iter().map(|r| r.date.date_naive()).collect();
    let average_score = if history.is_empty() {
        0.0
    } else {
        round_to_tenth(history.iter().map(|r| f64::from(r.score)).sum::<f64>() / history.len() as f64)
    };

    HistoryStats {
        session_count: history.len(),
        first_session_at: history.first().map(|r| r.date),
        study_days: days.len(),
        average_score,
        average_answer_time: round_to_tenth(weighted_answer_time(history)),
        trend: score_trend(history),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPerformance {
    pub date: NaiveDate,
    pub sessions: u32,
    pub average_score: f64,
    pub average_answer_time: f64,
    pub words: u32,
    pub correct: u32,
    pub time_seconds: u64,
}

/// Per UTC day, oldest first.
pub fn daily_performance(history: &[SessionResult]) -> Vec<DailyPerformance> {
    #[derive(Default)]
    struct Acc {
        sessions: u32,
        score_total: f64,
        avg_time_total: f64,
        timed_sessions: u32,
        words: u32,
        correct: u32,
        time_seconds: u64,
    }

    let ceiling = ANSWER_TIME_CEILING_SECS as f64;
    let mut days: BTreeMap<NaiveDate, Acc> = BTreeMap::new();
    for result in history {
        let acc = days.entry(result.date.date_naive()).or_default();
        acc.sessions += 1;
        acc.score_total += f64::from(result.score);
        if result.avg_answer_time >= 0.0 && result.avg_answer_time < ceiling {
            acc.avg_time_total += result.avg_answer_time;
            acc.timed_sessions += 1;
        }
        acc.words += result.total_questions;
        acc.correct += result.correct_answers;
        acc.time_seconds += result.time_seconds;
    }

    days.into_iter()
        .map(|(date, acc)| {
            let n = f64::from(acc.sessions);
            DailyPerformance {
                date,
                sessions: acc.sessions,
                average_score: round_to_tenth(acc.score_total / n),
                average_answer_time: if acc.timed_sessions == 0 {
                    0.0
                } else {
                    round_to_tenth(acc.avg_time_total / f64::from(acc.timed_sessions))
                },
                words: acc.words,
                correct: acc.correct,
                time_seconds: acc.time_seconds,
            }
        })
        .collect()
}
