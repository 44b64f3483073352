use chrono::Utc;
use tokio::sync::Mutex;

use crate::engine::VocabEngine;

/// 放弃超过空闲时长的测验与闪卡会话，不写入任何结果。
pub async fn run(engine: &Mutex<VocabEngine>) {
    tracing::debug!("session_cleanup: start");
    let sweep = engine.lock().await.abandon_idle_sessions(Utc::now());
    if sweep.quiz || sweep.flashcards {
        tracing::info!(quiz = sweep.quiz, flashcards = sweep.flashcards, "session_cleanup: idle sessions abandoned");
    } else {
        tracing::debug!("session_cleanup: nothing to do");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;

    use super::*;
    use crate::engine::testing::{engine_with, words, MemorySink};
    use crate::engine::QuestionType;

    #[tokio::test]
    async fn idle_deck_is_abandoned() {
        let mut engine = engine_with(Arc::new(MemorySink::default()), 3);
        let long_ago = Utc::now() - Duration::hours(5);
        engine
            .start_flashcards(&words(4), Some(2), QuestionType::TermToTranslation, false, long_ago)
            .unwrap();
        let engine = Mutex::new(engine);

        run(&engine).await;

        assert!(engine.lock().await.deck().is_none());
    }

    #[tokio::test]
    async fn fresh_deck_survives() {
        let mut engine = engine_with(Arc::new(MemorySink::default()), 3);
        engine
            .start_flashcards(&words(4), Some(2), QuestionType::TermToTranslation, false, Utc::now())
            .unwrap();
        let engine = Mutex::new(engine);

        run(&engine).await;

        assert!(engine.lock().await.deck().is_some());
    }
}
