use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::engine::session::ANSWER_TIME_CEILING_SECS;
use crate::engine::types::{SessionKind, SessionResult};

/// Flashcard runs without a measured time count ten seconds per word.
const FLASHCARD_SECS_PER_WORD: u64 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    /// `HH:MM`, UTC.
    pub time: String,
    pub kind: SessionKind,
    pub score: u32,
    pub word_count: u32,
    pub correct: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_answer_time: Option<f64>,
}

/// One line of a day's log. Records written by the old browser app hold
/// preformatted text instead of structured entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActivityEntry {
    Session(Activity),
    Note(String),
}

impl ActivityEntry {
    pub fn session(&self) -> Option<&Activity> {
        match self {
            Self::Session(activity) => Some(activity),
            Self::Note(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DayRecord {
    #[serde(alias = "testCount")]
    pub session_count: u32,
    pub word_count: u32,
    pub avg_score: u32,
    #[serde(alias = "studyTime")]
    pub study_minutes: u64,
    pub activities: Vec<ActivityEntry>,
}

/// Calendar data: one entry per UTC day with study activity.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudyRecord {
    pub days: BTreeMap<NaiveDate, DayRecord>,
    pub streak: u32,
    pub total_days: u32,
}

impl StudyRecord {
    /// Creates the day entry if missing. The streak continues when the
    /// previous day has an entry and restarts at one otherwise.
    pub fn touch_day(&mut self, date: NaiveDate) -> bool {
        if self.days.contains_key(&date) {
            return false;
        }
        let yesterday = date - Duration::days(1);
        if self.days.contains_key(&yesterday) {
            self.streak += 1;
        } else {
            self.streak = 1;
        }
        self.total_days += 1;
        self.days.insert(date, DayRecord::default());
        true
    }

    /// Folds a finished session into its day.
    pub fn record_session(&mut self, result: &SessionResult) {
        let date = result.date.date_naive();
        self.touch_day(date);
        let Some(day) = self.days.get_mut(&date) else {
            return;
        };

        let previous = u64::from(day.session_count);
        day.session_count += 1;
        day.word_count += result.total_questions;
        day.avg_score = ((u64::from(day.avg_score) * previous + u64::from(result.score)) as f64
            / (previous + 1) as f64)
            .round() as u32;

        let secs = if result.time_seconds > 0 {
            result.time_seconds
        } else if result.kind.is_flashcard() {
            u64::from(result.total_questions) * FLASHCARD_SECS_PER_WORD
        } else {
            0
        };
        day.study_minutes += (secs as f64 / 60.0).round() as u64;

        let ceiling = ANSWER_TIME_CEILING_SECS as f64;
        day.activities.push(ActivityEntry::Session(Activity {
            time: result.date.format("%H:%M").to_string(),
            kind: result.kind,
            score: result.score,
            word_count: result.total_questions,
            correct: result.correct_answers,
            avg_answer_time: Some(result.avg_answer_time).filter(|t| *t >= 0.0 && *t < ceiling),
        }));
    }

    pub fn day(&self, date: NaiveDate) -> Option<&DayRecord> {
        self.days.get(&date)
    }

    /// The stored streak while it is still alive on `today`, else `0`.
    pub fn current_streak(&self, today: NaiveDate) -> u32 {
        match self.days.keys().next_back() {
            Some(last) if *last == today || *last == today - Duration::days(1) => self.streak,
            _ => 0,
        }
    }

    pub fn month(&self, year: i32, month: u32, today: NaiveDate) -> Option<MonthView> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };

        let studied_days: Vec<u32> = self.days.range(first..next).map(|(d, _)| d.day()).collect();
        let (sessions, minutes) = self
            .days
            .range(first..next)
            .fold((0u32, 0u64), |(s, m), (_, day)| (s + day.session_count, m + day.study_minutes));

        Some(MonthView {
            year,
            month,
            days_in_month: (next - first).num_days() as u32,
            first_weekday: first.weekday().num_days_from_sunday(),
            monthly_study_days: studied_days.len() as u32,
            studied_days,
            sessions,
            study_minutes: minutes,
            streak: self.current_streak(today),
            total_days: self.total_days,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthView {
    pub year: i32,
    pub month: u32,
    pub days_in_month: u32,
    /// 0 = Sunday.
    pub first_weekday: u32,
    pub studied_days: Vec<u32>,
    pub monthly_study_days: u32,
    pub sessions: u32,
    pub study_minutes: u64,
    pub streak: u32,
    pub total_days: u32,
}
