use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{broadcast, Mutex, MutexGuard};

use crate::config::Config;
use crate::engine::VocabEngine;
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    store: Arc<Store>,
    engine: Arc<Mutex<VocabEngine>>,
    config: Arc<Config>,
    shutdown_tx: broadcast::Sender<()>,
    started_at: Instant,
}

impl AppState {
    pub fn new(
        store: Arc<Store>,
        engine: Arc<Mutex<VocabEngine>>,
        config: &Config,
        shutdown_tx: broadcast::Sender<()>,
    ) -> Self {
        Self {
            store,
            engine,
            config: Arc::new(config.clone()),
            shutdown_tx,
            started_at: Instant::now(),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// 每个命令持锁一次，保证答题记录先于下一次选词。
    pub async fn engine(&self) -> MutexGuard<'_, VocabEngine> {
        self.engine.lock().await
    }

    pub fn engine_handle(&self) -> Arc<Mutex<VocabEngine>> {
        self.engine.clone()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn shutdown_rx(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    pub fn shutdown_tx(&self) -> &broadcast::Sender<()> {
        &self.shutdown_tx
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
