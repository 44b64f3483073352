use std::sync::Arc;

use axum::Router;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;
use tokio::sync::{broadcast, Mutex};

use vocab_trainer::config::{Config, EngineEnvConfig, WorkerConfig};
use vocab_trainer::engine::{EngineConfig, VocabEngine};
use vocab_trainer::routes::build_router;
use vocab_trainer::state::AppState;
use vocab_trainer::store::Store;

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub store: Arc<Store>,
    pub config: Config,
    _temp_dir: Option<TempDir>,
}

pub fn test_config(sled_path: String) -> Config {
    // 直接构造 Config，避免使用 set_var 造成多线程测试环境变量竞态
    Config {
        host: std::net::IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
        port: 3000,
        log_level: "info".to_string(),
        enable_file_logs: false,
        log_dir: "./logs".to_string(),
        sled_path,
        cors_origin: "http://localhost:5173".to_string(),
        seed_demo_words: false,
        worker: WorkerConfig {
            is_leader: false,
            session_cleanup_interval_mins: 10,
        },
        engine: EngineEnvConfig {
            // 快速测验不重置最近窗口，保证选词可复现
            recency_reset_probability: 0.0,
            quick_test_size: 10,
            default_flashcard_count: 20,
            session_idle_timeout_mins: 120,
        },
    }
}

/// Builds the app over an existing sled path, loading persisted learner state.
pub fn app_at(temp_dir: Option<TempDir>, sled_path: String) -> TestApp {
    let config = test_config(sled_path);

    let store = Arc::new(Store::open(&config.sled_path).expect("open store"));
    store.run_migrations().expect("run migrations");

    let engine = VocabEngine::new(
        EngineConfig::from_env(&config.engine),
        store.load_progress().expect("load progress"),
        store.load_study_record().expect("load study record"),
        store.clone(),
    )
    .with_rng(StdRng::seed_from_u64(42));

    let (shutdown_tx, _) = broadcast::channel::<()>(8);
    let state = AppState::new(
        store.clone(),
        Arc::new(Mutex::new(engine)),
        &config,
        shutdown_tx,
    );
    let app = build_router(state.clone());

    TestApp {
        app,
        state,
        store,
        config,
        _temp_dir: temp_dir,
    }
}

pub async fn spawn_test_app() -> TestApp {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let sled_path = temp_dir.path().join("vocab-test.sled");
    let sled_path = sled_path.to_string_lossy().to_string();
    app_at(Some(temp_dir), sled_path)
}

/// Test app whose corpus holds `count` generated words.
pub async fn spawn_with_words(count: usize) -> TestApp {
    let app = spawn_test_app().await;
    super::fixtures::seed_words(&app.store, count, None);
    app
}
