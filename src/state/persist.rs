//! Configuration snapshot that survives a reload.
//!
//! Only the setup choices are persisted; live round data (players, roles,
//! the secret word) never touches disk.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::{AppState, GameError, GameResult};
use crate::types::*;
use crate::words::cache::write_json_atomic;
use crate::words::CacheError;

/// Schema version for persisted configuration
/// Version 1: initial layout
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed configuration: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Failed to write configuration: {0}")]
    Write(#[from] CacheError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PersistedConfig {
    pub schema_version: u32,
    pub total_players: usize,
    pub impostor_count: usize,
    pub language: Locale,
    #[serde(default)]
    pub selected_categories: Vec<CategoryId>,
    #[serde(default = "default_show_hints")]
    pub show_hints_to_impostors: bool,
    #[serde(default)]
    pub custom_categories: Vec<CategoryId>,
    #[serde(default)]
    pub player_names: Vec<String>,
}

fn default_show_hints() -> bool {
    true
}

impl PersistedConfig {
    pub fn from_session(session: &Session) -> Self {
        let game = &session.game;
        Self {
            schema_version: CONFIG_SCHEMA_VERSION,
            total_players: game.total_players,
            impostor_count: game.impostor_count,
            language: game.language,
            selected_categories: game.selected_categories.clone(),
            show_hints_to_impostors: game.show_hints_to_impostors,
            custom_categories: session.custom_categories.clone(),
            player_names: session.player_names.clone(),
        }
    }

    /// Validate before import
    pub fn validate(&self) -> Result<(), String> {
        if self.schema_version > CONFIG_SCHEMA_VERSION {
            return Err(format!(
                "Config schema version {} is newer than supported version {}",
                self.schema_version, CONFIG_SCHEMA_VERSION
            ));
        }

        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.total_players) {
            return Err(format!(
                "totalPlayers must be between {} and {}, got {}",
                MIN_PLAYERS, MAX_PLAYERS, self.total_players
            ));
        }

        if self.impostor_count == 0 || self.impostor_count >= self.total_players {
            return Err(format!(
                "impostorCount must be between 1 and {}, got {}",
                self.total_players - 1,
                self.impostor_count
            ));
        }

        if self.player_names.len() > MAX_PLAYERS {
            return Err(format!(
                "At most {} player names are allowed, got {}",
                MAX_PLAYERS,
                self.player_names.len()
            ));
        }

        if let Some(blank) = self.custom_categories.iter().find(|c| c.trim().is_empty()) {
            return Err(format!("Custom category '{}' is blank", blank));
        }

        Ok(())
    }

    /// Copy the configuration into a session that is in setup
    fn apply(self, session: &mut Session) {
        let game = &mut session.game;
        game.total_players = self.total_players;
        game.impostor_count = self.impostor_count;
        game.language = self.language;
        game.selected_categories = self.selected_categories;
        game.show_hints_to_impostors = self.show_hints_to_impostors;
        session.custom_categories = self.custom_categories;
        session.player_names = self.player_names;
    }
}

/// JSON file holding the persisted configuration
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored configuration; `None` if nothing was saved yet
    pub async fn load(&self) -> Result<Option<PersistedConfig>, ConfigError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let config: PersistedConfig = serde_json::from_slice(&bytes)?;
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(Some(config))
    }

    pub async fn save(&self, config: &PersistedConfig) -> Result<(), ConfigError> {
        let bytes = serde_json::to_vec_pretty(config)?;
        write_json_atomic(&self.path, &bytes).await?;
        Ok(())
    }
}

impl AppState {
    /// Snapshot of the persistable configuration
    pub async fn export_config(&self) -> PersistedConfig {
        let session = self.session.read().await;
        PersistedConfig::from_session(&session)
    }

    /// Replace the setup configuration. Only allowed during setup.
    pub async fn import_config(&self, config: PersistedConfig) -> GameResult<()> {
        config.validate().map_err(GameError::InvalidConfig)?;

        self.mutate_setup(|session| {
            config.apply(session);
            Ok(())
        })
        .await?;
        self.mark_locale_seeded();

        tracing::info!("Configuration imported");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::StaticTranslator;

    fn sample() -> PersistedConfig {
        PersistedConfig {
            schema_version: CONFIG_SCHEMA_VERSION,
            total_players: 6,
            impostor_count: 2,
            language: Locale::En,
            selected_categories: vec!["food".to_string(), "Cars".to_string()],
            show_hints_to_impostors: false,
            custom_categories: vec!["Cars".to_string()],
            player_names: vec!["Anna".to_string(), "Ben".to_string()],
        }
    }

    #[test]
    fn test_validate() {
        assert!(sample().validate().is_ok());

        let mut config = sample();
        config.schema_version = CONFIG_SCHEMA_VERSION + 1;
        assert!(config.validate().is_err());

        let mut config = sample();
        config.total_players = 11;
        assert!(config.validate().is_err());

        let mut config = sample();
        config.impostor_count = 6;
        assert!(config.validate().is_err());

        let mut config = sample();
        config.custom_categories.push("  ".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_optional_fields_use_defaults() {
        let json = r#"{"schemaVersion":1,"totalPlayers":4,"impostorCount":1,"language":"de"}"#;
        let config: PersistedConfig = serde_json::from_str(json).unwrap();

        assert!(config.show_hints_to_impostors);
        assert!(config.selected_categories.is_empty());
        assert!(config.player_names.is_empty());
    }

    #[tokio::test]
    async fn test_export_import_between_sessions() {
        let state = AppState::new();
        state.import_config(sample()).await.unwrap();

        let exported = state.export_config().await;
        assert_eq!(exported, sample());
        assert!(!state.seed_language(Locale::De).await);

        let game = state.get_game().await;
        assert_eq!(game.total_players, 6);
        assert!(!game.show_hints_to_impostors);
        assert!(game.players.is_empty());
    }

    #[tokio::test]
    async fn test_import_rejected_outside_setup() {
        let state = AppState::new();
        state.toggle_category("animals").await.unwrap();
        state
            .start_game(&StaticTranslator::new(Locale::De))
            .await
            .unwrap();

        let err = state.import_config(sample()).await.unwrap_err();
        assert_eq!(err, GameError::NotInSetup(GamePhase::WordReveal));
        assert_eq!(state.get_game().await.total_players, 3);
    }

    #[tokio::test]
    async fn test_import_rejects_invalid_config() {
        let state = AppState::new();
        let mut config = sample();
        config.total_players = 2;

        let err = state.import_config(config).await.unwrap_err();
        assert!(matches!(err, GameError::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn test_store_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("nested").join("config.json"));

        assert!(store.load().await.unwrap().is_none());

        store.save(&sample()).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(sample()));
    }

    #[tokio::test]
    async fn test_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        tokio::fs::write(&path, b"{not json").await.unwrap();

        let store = ConfigStore::new(&path);
        assert!(matches!(store.load().await, Err(ConfigError::Serde(_))));
    }
}
