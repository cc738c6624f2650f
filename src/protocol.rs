use crate::types::*;
use serde::{Deserialize, Serialize};

/// Wire protocol version sent in `Welcome`
pub const PROTOCOL_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    // Setup
    SetPlayerCount {
        count: usize,
    },
    SetPlayerName {
        index: usize,
        name: String,
    },
    SetImpostorCount {
        count: usize,
    },
    SetLanguage {
        language: Locale,
    },
    ToggleCategory {
        category: CategoryId,
    },
    AddCustomCategory {
        name: String,
    },
    RemoveCustomCategory {
        name: String,
    },
    /// Live contents of the "add category" input
    SetCustomCategory {
        text: String,
    },
    ToggleHints,
    StartGame,

    // Word reveal
    /// Show one player their card; the answer goes only to the requesting socket
    RevealCard {
        player_index: usize,
    },
    NextRevealPlayer,
    StartDiscussion,

    // Discussion / results
    EndGame,
    NewGame,
    /// Ask for the round summary (results phase only)
    GetResults,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome {
        protocol: String,
        session: Session,
        server_now: String,
        valid_transitions: Vec<GamePhase>,
    },
    /// Full session after any change
    State {
        session: Session,
    },
    Card {
        card: RevealCard,
    },
    Results {
        results: RoundResults,
    },
    Error {
        code: String,
        msg: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_wire_format() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"t":"set_player_count","count":5}"#).unwrap();
        assert!(matches!(msg, ClientMessage::SetPlayerCount { count: 5 }));

        let msg: ClientMessage =
            serde_json::from_str(r#"{"t":"set_language","language":"en"}"#).unwrap();
        assert!(matches!(
            msg,
            ClientMessage::SetLanguage {
                language: Locale::En
            }
        ));

        let msg: ClientMessage = serde_json::from_str(r#"{"t":"start_game"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::StartGame));

        assert!(serde_json::from_str::<ClientMessage>(r#"{"t":"set_language","language":"fr"}"#).is_err());
    }

    #[test]
    fn test_card_message_tags_role() {
        let msg = ServerMessage::Card {
            card: RevealCard::Impostor {
                player: Player {
                    id: 2,
                    name: "Ben".to_string(),
                    role: PlayerRole::Impostor,
                },
                hint: Some("fur".to_string()),
                category: "animals".to_string(),
            },
        };
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["t"], "card");
        assert_eq!(json["card"]["role"], "impostor");
        assert_eq!(json["card"]["hint"], "fur");
        assert!(json["card"].get("word").is_none());
    }
}
