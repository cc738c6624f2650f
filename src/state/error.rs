use crate::types::{GamePhase, MAX_PLAYERS, MIN_PLAYERS};

/// Reasons the session rejects an operation. A rejected operation never
/// changes state.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GameError {
    #[error("Please select at least one category")]
    NoCategorySelected,

    #[error("A game is already being started")]
    StartInProgress,

    #[error("Invalid phase transition from {from:?} to {to:?}")]
    InvalidTransition { from: GamePhase, to: GamePhase },

    #[error("Only allowed during setup (current phase: {0:?})")]
    NotInSetup(GamePhase),

    #[error("Only allowed during {expected:?} (current phase: {actual:?})")]
    WrongPhase {
        expected: GamePhase,
        actual: GamePhase,
    },

    #[error("Player count must be between {min} and {max}, got {0}", min = MIN_PLAYERS, max = MAX_PLAYERS)]
    InvalidPlayerCount(usize),

    #[error("Impostor count must be between 1 and {max}, got {count}")]
    InvalidImpostorCount { count: usize, max: usize },

    #[error("No player at index {0}")]
    InvalidPlayerIndex(usize),

    #[error("Not every player has seen their card yet ({revealed} of {total})")]
    RevealIncomplete { revealed: usize, total: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl GameError {
    /// Stable code for the wire protocol
    pub fn code(&self) -> &'static str {
        match self {
            GameError::NoCategorySelected => "NO_CATEGORY_SELECTED",
            GameError::StartInProgress => "START_IN_PROGRESS",
            GameError::InvalidTransition { .. } => "TRANSITION_FAILED",
            GameError::NotInSetup(_) => "NOT_IN_SETUP",
            GameError::WrongPhase { .. } => "WRONG_PHASE",
            GameError::InvalidPlayerCount(_) => "INVALID_PLAYER_COUNT",
            GameError::InvalidImpostorCount { .. } => "INVALID_IMPOSTOR_COUNT",
            GameError::InvalidPlayerIndex(_) => "INVALID_PLAYER_INDEX",
            GameError::RevealIncomplete { .. } => "REVEAL_INCOMPLETE",
            GameError::InvalidConfig(_) => "INVALID_CONFIG",
        }
    }
}
