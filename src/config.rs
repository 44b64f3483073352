use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
    pub sled_path: String,
    pub cors_origin: String,
    /// 词库为空时写入演示单词
    pub seed_demo_words: bool,
    pub worker: WorkerConfig,
    pub engine: EngineEnvConfig,
}

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub is_leader: bool,
    pub session_cleanup_interval_mins: u64,
}

#[derive(Debug, Clone)]
pub struct EngineEnvConfig {
    pub recency_reset_probability: f64,
    pub quick_test_size: usize,
    pub default_flashcard_count: usize,
    pub session_idle_timeout_mins: i64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env_or_parse("HOST", IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))),
            port: env_or_parse("PORT", 3000_u16),
            log_level: env_or("RUST_LOG", "info"),
            enable_file_logs: env_or_bool("ENABLE_FILE_LOGS", false),
            log_dir: env_or("LOG_DIR", "./logs"),
            sled_path: env_or("SLED_PATH", "./data/vocab.sled"),
            cors_origin: env_or("CORS_ORIGIN", "http://localhost:5173"),
            seed_demo_words: env_or_bool("SEED_DEMO_WORDS", true),
            worker: WorkerConfig {
                is_leader: env_or_bool("WORKER_LEADER", true),
                session_cleanup_interval_mins: env_or_parse("SESSION_CLEANUP_INTERVAL_MINS", 10_u64),
            },
            engine: EngineEnvConfig {
                recency_reset_probability: env_or_parse("RECENCY_RESET_PROBABILITY", 0.15_f64),
                quick_test_size: env_or_parse("QUICK_TEST_SIZE", 10_usize),
                default_flashcard_count: env_or_parse("DEFAULT_FLASHCARD_COUNT", 20_usize),
                session_idle_timeout_mins: env_or_parse("SESSION_IDLE_TIMEOUT_MINS", 120_i64),
            },
        }
    }
}

pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_or_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(
                    key,
                    value = %raw,
                    "Failed to parse env var, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}

pub fn env_or_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}
