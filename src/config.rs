//! Server configuration from the environment

use std::path::PathBuf;
use std::time::Duration;

use crate::llm::non_empty_env;
use crate::words::DEFAULT_GENERATION_TIMEOUT;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Holds `config.json` and `word_cache.json`
    pub data_dir: PathBuf,
    /// Bound on a remote word generation before falling back to static words
    pub generation_timeout: Duration,
    pub autosave_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            data_dir: PathBuf::from("data"),
            generation_timeout: DEFAULT_GENERATION_TIMEOUT,
            autosave_interval: Duration::from_millis(2000),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            port: parse_env("IMPOSTOR_PORT").unwrap_or(defaults.port),
            data_dir: non_empty_env("IMPOSTOR_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            generation_timeout: parse_env("WORDGEN_TIMEOUT")
                .map(Duration::from_secs)
                .unwrap_or(defaults.generation_timeout),
            autosave_interval: parse_env("AUTOSAVE_INTERVAL_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.autosave_interval),
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join("config.json")
    }

    pub fn word_cache_path(&self) -> PathBuf {
        self.data_dir.join("word_cache.json")
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    let value = non_empty_env(key)?;
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::warn!("Ignoring invalid {}={:?}", key, value);
            None
        }
    }
}
