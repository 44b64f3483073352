use std::collections::VecDeque;

pub const RECENCY_WINDOW_CAP: usize = 10;

/// Terms most recently handed out by the selector, newest first.
///
/// Used only to soften re-selection; never persisted.
#[derive(Debug, Clone, Default)]
pub struct RecencyWindow {
    terms: VecDeque<String>,
}

impl RecencyWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepends `terms` keeping their order, then drops the oldest beyond the cap.
    pub fn record_selection<S: AsRef<str>>(&mut self, terms: &[S]) {
        for term in terms.iter().rev() {
            self.terms.push_front(term.as_ref().to_string());
        }
        self.terms.truncate(RECENCY_WINDOW_CAP);
    }

    pub fn is_recent(&self, term: &str) -> bool {
        self.terms.iter().any(|t| t == term)
    }

    pub fn reset(&mut self) {
        self.terms.clear();
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}
