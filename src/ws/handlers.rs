//! WebSocket message dispatch
//!
//! Every client command maps onto one session operation. Successful changes
//! are broadcast to all clients as a full `State`; failures are answered
//! only to the sender.

use crate::i18n::StaticTranslator;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::{AppState, GameError, GameResult};
use std::sync::Arc;

impl From<GameError> for ServerMessage {
    fn from(e: GameError) -> Self {
        ServerMessage::Error {
            code: e.code().to_string(),
            msg: e.to_string(),
        }
    }
}

/// Broadcast the new state on success, reply with the error otherwise
async fn broadcast_or_error(state: &AppState, result: GameResult<()>) -> Option<ServerMessage> {
    match result {
        Ok(()) => {
            state.broadcast_state().await;
            None
        }
        Err(e) => {
            tracing::debug!("Rejected: {}", e);
            Some(e.into())
        }
    }
}

/// Translator for the language the session is currently set to
async fn session_translator(state: &AppState) -> StaticTranslator {
    StaticTranslator::new(state.get_game().await.language)
}

/// Handle client messages and return optional response
pub async fn handle_message(msg: ClientMessage, state: &Arc<AppState>) -> Option<ServerMessage> {
    let result = match msg {
        ClientMessage::SetPlayerCount { count } => {
            let translator = session_translator(state).await;
            state.set_player_count(count, &translator).await
        }
        ClientMessage::SetPlayerName { index, name } => state.set_player_name(index, name).await,
        ClientMessage::SetImpostorCount { count } => state.set_impostor_count(count).await,
        ClientMessage::SetLanguage { language } => state.set_language(language).await,
        ClientMessage::ToggleCategory { category } => state.toggle_category(&category).await,
        ClientMessage::AddCustomCategory { name } => state.add_custom_category(&name).await,
        ClientMessage::RemoveCustomCategory { name } => state.remove_custom_category(&name).await,
        ClientMessage::SetCustomCategory { text } => state.set_custom_category(text).await,
        ClientMessage::ToggleHints => state.toggle_hints().await,

        ClientMessage::StartGame => {
            let translator = session_translator(state).await;
            state.start_game(&translator).await.map(|_| ())
        }

        ClientMessage::RevealCard { player_index } => {
            return match state.reveal_card(player_index).await {
                Ok(card) => {
                    state.broadcast_state().await;
                    Some(ServerMessage::Card { card })
                }
                Err(e) => Some(e.into()),
            };
        }
        ClientMessage::NextRevealPlayer => state.next_reveal_player().await.map(|_| ()),
        ClientMessage::StartDiscussion => state.start_discussion().await,

        ClientMessage::EndGame => state.end_game().await,
        ClientMessage::NewGame => state.new_game().await,
        ClientMessage::GetResults => {
            return match state.results().await {
                Ok(results) => Some(ServerMessage::Results { results }),
                Err(e) => Some(e.into()),
            };
        }
    };

    broadcast_or_error(state, result).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GamePhase, Locale};

    #[tokio::test]
    async fn test_successful_command_is_broadcast() {
        let state = Arc::new(AppState::new());
        let mut rx = state.broadcast.subscribe();

        let reply = handle_message(
            ClientMessage::ToggleCategory {
                category: "food".to_string(),
            },
            &state,
        )
        .await;

        assert!(reply.is_none());
        match rx.recv().await.unwrap() {
            ServerMessage::State { session } => {
                assert_eq!(session.game.selected_categories, vec!["food"])
            }
            other => panic!("Expected State, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rejection_is_answered_with_code() {
        let state = Arc::new(AppState::new());

        match handle_message(ClientMessage::StartGame, &state).await {
            Some(ServerMessage::Error { code, .. }) => assert_eq!(code, "NO_CATEGORY_SELECTED"),
            other => panic!("Expected error, got {:?}", other),
        }

        match handle_message(ClientMessage::EndGame, &state).await {
            Some(ServerMessage::Error { code, .. }) => assert_eq!(code, "TRANSITION_FAILED"),
            other => panic!("Expected error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_default_names_follow_session_language() {
        let state = Arc::new(AppState::new());
        handle_message(ClientMessage::SetLanguage { language: Locale::De }, &state).await;
        handle_message(ClientMessage::SetPlayerCount { count: 4 }, &state).await;

        let session = state.get_session().await;
        assert_eq!(session.player_names[3], "Spieler 4");
    }

    #[tokio::test]
    async fn test_reveal_card_answers_sender_only_with_card() {
        let state = Arc::new(AppState::new());
        handle_message(
            ClientMessage::ToggleCategory {
                category: "objects".to_string(),
            },
            &state,
        )
        .await;
        assert!(handle_message(ClientMessage::StartGame, &state).await.is_none());
        assert_eq!(state.get_game().await.phase, GamePhase::WordReveal);

        let reply = handle_message(ClientMessage::RevealCard { player_index: 1 }, &state).await;
        assert!(matches!(reply, Some(ServerMessage::Card { .. })));
        assert_eq!(state.get_game().await.revealed_players, vec![1]);
    }
}
