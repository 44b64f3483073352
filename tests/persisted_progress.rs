mod common;

use axum::http::Method;
use serde_json::json;

use common::app::app_at;
use common::fixtures::seed_words;
use common::http::call;
use vocab_trainer::store::Store;

#[tokio::test]
async fn it_progress_survives_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("restart.sled").to_string_lossy().to_string();

    {
        let app = app_at(None, path.clone());
        seed_words(&app.store, 5, None);
        call(&app.app, Method::POST, "/api/quiz/start", Some(json!({"count": 1}))).await;
        call(&app.app, Method::POST, "/api/quiz/answer", Some(json!({"correct": false}))).await;
        call(&app.app, Method::POST, "/api/quiz/next", None).await;
        app.store.flush().expect("flush");
    }

    let app = app_at(None, path);
    let (_, summary) = call(&app.app, Method::GET, "/api/progress", None).await;
    assert_eq!(summary["data"]["totalSessions"], 1);
    assert_eq!(summary["data"]["weaknessCount"], 1);

    let (_, words) = call(&app.app, Method::GET, "/api/words", None).await;
    assert_eq!(words["data"]["total"], 5);
}

#[tokio::test]
async fn it_legacy_blob_loads_with_old_field_names() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("legacy.sled").to_string_lossy().to_string();

    {
        let store = Store::open(&path).expect("open store");
        let legacy = json!({
            "totalTests": 3,
            "wordMastery": {
                "issue": {"attempts": 2, "correct": 5, "recentAttempts": [true, false]}
            },
            "recentlyWrongWords": ["issue", "issue"],
            "testHistory": [
                {"date": "2024-05-01T08:00:00Z", "type": "en_to_ja", "totalQuestions": 10,
                 "correctAnswers": 8, "score": 80, "timeSeconds": 60, "avgAnswerTime": 6.0}
            ]
        });
        store
            .put_raw_progress(legacy.to_string().as_bytes())
            .expect("write legacy blob");
        store.flush().expect("flush");
    }

    let app = app_at(None, path);
    let (_, summary) = call(&app.app, Method::GET, "/api/progress", None).await;
    assert_eq!(summary["data"]["totalSessions"], 3);
    assert_eq!(summary["data"]["learnedWords"], 1);
    assert_eq!(summary["data"]["weaknessCount"], 1);

    let (_, stats) = call(&app.app, Method::GET, "/api/stats", None).await;
    assert_eq!(stats["data"]["sessionCount"], 1);
    assert_eq!(stats["data"]["averageScore"], 80.0);
}

#[tokio::test]
async fn it_malformed_blob_resets_to_empty_progress() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("broken.sled").to_string_lossy().to_string();

    {
        let store = Store::open(&path).expect("open store");
        store.put_raw_progress(b"{not json").expect("write blob");
        store.flush().expect("flush");
    }

    let app = app_at(None, path);
    let (status, summary) = call(&app.app, Method::GET, "/api/progress", None).await;
    assert!(status.is_success());
    assert_eq!(summary["data"]["totalSessions"], 0);
    assert_eq!(summary["data"]["learnedWords"], 0);
}
