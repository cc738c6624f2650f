use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque ID types for type safety
pub type PlayerId = u32;
pub type WordSetId = String;
pub type CategoryId = String;

/// Smallest and largest table the game supports
pub const MIN_PLAYERS: usize = 3;
pub const MAX_PLAYERS: usize = 10;

/// Categories offered out of the box (custom ones are appended by the user)
pub const BUILTIN_CATEGORIES: &[&str] = &[
    "animals",
    "food",
    "objects",
    "movies",
    "places",
    "professions",
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    #[default]
    De,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::En, Locale::De];

    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::De => "de",
        }
    }

    /// Human readable language name, used in generation prompts
    pub fn language_name(&self) -> &'static str {
        match self {
            Locale::En => "English",
            Locale::De => "German",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "de" => Ok(Locale::De),
            other => Err(format!("Unsupported locale: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlayerRole {
    Player,
    Impostor,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    /// 1-indexed, stable for the round
    pub id: PlayerId,
    pub name: String,
    pub role: PlayerRole,
}

impl Player {
    pub fn is_impostor(&self) -> bool {
        self.role == PlayerRole::Impostor
    }
}

/// A secret word with hints ordered general to specific
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WordWithHints {
    pub word: String,
    pub hints: Vec<String>,
}

/// A cached batch of not-yet-used words for one (category, language) pair
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WordSet {
    pub id: WordSetId,
    /// Always stored lowercased
    pub category: String,
    pub language: Locale,
    pub words_with_hints: Vec<WordWithHints>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub usage_count: u32,
}

/// Partial update applied to a cached word set
#[derive(Debug, Clone, Default)]
pub struct WordSetUpdate {
    pub words_with_hints: Option<Vec<WordWithHints>>,
    pub usage_count: Option<u32>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    #[default]
    Setup,
    WordReveal,
    Discussion,
    Results,
}

/// Authoritative state of the session; drives which view the UI renders
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub phase: GamePhase,
    pub players: Vec<Player>,
    pub total_players: usize,
    pub impostor_count: usize,
    pub current_word: String,
    pub current_hints: Vec<String>,
    pub current_category: String,
    pub selected_categories: Vec<CategoryId>,
    /// Scratch input of the "add category" field
    pub custom_category: String,
    pub language: Locale,
    pub show_hints_to_impostors: bool,
    pub current_reveal_index: usize,
    /// Indices into `players` whose card has been viewed
    pub revealed_players: Vec<usize>,
    pub game_started: bool,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            phase: GamePhase::Setup,
            players: Vec::new(),
            total_players: MIN_PLAYERS,
            impostor_count: 1,
            current_word: String::new(),
            current_hints: Vec::new(),
            current_category: String::new(),
            selected_categories: Vec::new(),
            custom_category: String::new(),
            language: Locale::De,
            show_hints_to_impostors: true,
            current_reveal_index: 0,
            revealed_players: Vec::new(),
            game_started: false,
        }
    }
}

/// Game state plus the setup buffers that live next to it
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub game: GameState,
    pub player_names: Vec<String>,
    pub custom_categories: Vec<CategoryId>,
}

/// What a single player sees when their card is turned over
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum RevealCard {
    Player {
        player: Player,
        word: String,
        category: String,
    },
    Impostor {
        player: Player,
        hint: Option<String>,
        category: String,
    },
}

/// Summary shown once the round has ended
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoundResults {
    pub word: String,
    pub category: String,
    pub impostors: Vec<Player>,
}
