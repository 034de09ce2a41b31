// src/config.rs
use std::env;

/// Service configuration derived from environment variables.
///
/// Variable names are kept compatible with the docker-compose environment the
/// scraper and trader services already read, so one `.env` file serves all
/// three containers.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub redis_host: String,
    pub redis_password: Option<String>,
    /// Trade-creation endpoint of the external trading service.
    pub trader_url: String,
    /// Number of detection workers draining the notification queue.
    pub worker_count: usize,
    /// Error tolerance handed to the pattern matcher.
    pub error_allowed: f64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            redis_host: env_str("REDIS_HOST", "localhost"),
            redis_password: env::var("REDIS_PASSWORD")
                .ok()
                .filter(|s| !s.is_empty()),
            trader_url: env_str("TRADER_URL", "http://trader:3000/trade"),
            worker_count: env_usize("WORKER_COUNT", 4),
            error_allowed: env_f64("ERROR_ALLOWED", 0.5),
        }
    }

    /// Connection URL for the redis client.
    pub fn redis_url(&self) -> String {
        match &self.redis_password {
            Some(password) => format!("redis://default:{}@{}:6379", password, self.redis_host),
            None => format!("redis://{}:6379", self.redis_host),
        }
    }
}

fn env_str(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .filter(|n: &usize| *n > 0)
        .unwrap_or(default)
}

fn env_f64(name: &str, default: f64) -> f64 {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}
