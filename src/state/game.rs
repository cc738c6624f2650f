use rand::seq::IndexedRandom;
use std::sync::atomic::{AtomicBool, Ordering};

use super::roles::{assign_impostors, build_roster, choose_category};
use super::{AppState, GameError, GameResult};
use crate::i18n::Translator;
use crate::types::*;

/// Raises the in-flight flag for the lifetime of a `start_game` call
struct StartingFlag<'a>(&'a AtomicBool);

impl<'a> StartingFlag<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for StartingFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl AppState {
    /// Check if a phase transition is valid
    pub fn is_valid_phase_transition(from: GamePhase, to: GamePhase) -> bool {
        use GamePhase::*;

        matches!(
            (from, to),
            (Setup, WordReveal) | (WordReveal, Discussion) | (Discussion, Results) | (Results, Setup)
        )
    }

    /// Phases reachable from `from`
    pub fn get_valid_transitions(from: GamePhase) -> Vec<GamePhase> {
        use GamePhase::*;

        [Setup, WordReveal, Discussion, Results]
            .into_iter()
            .filter(|to| Self::is_valid_phase_transition(from, *to))
            .collect()
    }

    /// Move the session to `to` under an already held write lock
    fn transition(game: &mut GameState, to: GamePhase) -> GameResult<()> {
        if !Self::is_valid_phase_transition(game.phase, to) {
            return Err(GameError::InvalidTransition {
                from: game.phase,
                to,
            });
        }
        tracing::info!("Phase {:?} -> {:?}", game.phase, to);
        game.phase = to;
        Ok(())
    }

    fn require_phase(game: &GameState, expected: GamePhase) -> GameResult<()> {
        if game.phase != expected {
            return Err(GameError::WrongPhase {
                expected,
                actual: game.phase,
            });
        }
        Ok(())
    }

    /// Deal a new round: roster, roles, category and secret word.
    ///
    /// Only one start may be in flight; a concurrent call gets
    /// `StartInProgress`. Nothing is published until the word is in hand,
    /// and then everything is published under one write lock.
    pub async fn start_game(&self, translator: &dyn Translator) -> GameResult<GameState> {
        let _guard = self
            .start_lock
            .try_lock()
            .map_err(|_| GameError::StartInProgress)?;
        // Raised before the snapshot so no setup edit can land between the
        // snapshot and the publish below
        let _starting = StartingFlag::raise(&self.starting);

        let snapshot = self.get_session().await;
        let config = &snapshot.game;

        if config.phase != GamePhase::Setup {
            return Err(GameError::InvalidTransition {
                from: config.phase,
                to: GamePhase::WordReveal,
            });
        }
        if config.selected_categories.is_empty() {
            tracing::warn!("{}", translator.translate("noCategorySelected"));
            return Err(GameError::NoCategorySelected);
        }

        // ThreadRng is not Send, so it must not live across the await below
        let (players, category) = {
            let mut rng = rand::rng();
            let mut players = build_roster(&snapshot.player_names, config.total_players, translator);
            assign_impostors(&mut players, config.impostor_count, &mut rng);
            let category = choose_category(&config.selected_categories, &mut rng)
                .cloned()
                .ok_or(GameError::NoCategorySelected)?;
            (players, category)
        };

        let word = self
            .words
            .get_random_word_with_hints(&category, config.language)
            .await;

        let mut session = self.session.write().await;
        let game = &mut session.game;
        Self::transition(game, GamePhase::WordReveal)?;
        game.game_started = true;
        game.players = players;
        game.current_word = word.word;
        game.current_hints = word.hints;
        game.current_category = category;
        game.current_reveal_index = 0;
        game.revealed_players.clear();

        tracing::info!(
            "Game started: {} players, {} impostor(s), category '{}'",
            game.players.len(),
            config.impostor_count,
            game.current_category
        );
        Ok(game.clone())
    }

    /// Advance the advisory reveal pointer
    pub async fn next_reveal_player(&self) -> GameResult<usize> {
        let mut session = self.session.write().await;
        Self::require_phase(&session.game, GamePhase::WordReveal)?;
        session.game.current_reveal_index += 1;
        Ok(session.game.current_reveal_index)
    }

    /// Turn over the card of the player at `index` and record it as seen.
    /// Impostors get one random hint when hints are enabled.
    pub async fn reveal_card(&self, index: usize) -> GameResult<RevealCard> {
        let mut session = self.session.write().await;
        let game = &mut session.game;
        Self::require_phase(game, GamePhase::WordReveal)?;

        let player = game
            .players
            .get(index)
            .cloned()
            .ok_or(GameError::InvalidPlayerIndex(index))?;

        if !game.revealed_players.contains(&index) {
            game.revealed_players.push(index);
        }

        let category = game.current_category.clone();
        let card = if player.is_impostor() {
            let hint = if game.show_hints_to_impostors {
                game.current_hints.choose(&mut rand::rng()).cloned()
            } else {
                None
            };
            RevealCard::Impostor {
                player,
                hint,
                category,
            }
        } else {
            RevealCard::Player {
                player,
                word: game.current_word.clone(),
                category,
            }
        };

        Ok(card)
    }

    /// True once every player has seen their card
    pub async fn is_reveal_complete(&self) -> bool {
        let session = self.session.read().await;
        reveal_complete(&session.game)
    }

    pub async fn start_discussion(&self) -> GameResult<()> {
        let mut session = self.session.write().await;
        let game = &mut session.game;
        if game.phase == GamePhase::WordReveal && !reveal_complete(game) {
            return Err(GameError::RevealIncomplete {
                revealed: game.revealed_players.len(),
                total: game.players.len(),
            });
        }
        Self::transition(game, GamePhase::Discussion)
    }

    pub async fn end_game(&self) -> GameResult<()> {
        let mut session = self.session.write().await;
        Self::transition(&mut session.game, GamePhase::Results)
    }

    /// Clear the round and go back to setup. Configuration is kept.
    pub async fn new_game(&self) -> GameResult<()> {
        let mut session = self.session.write().await;
        let game = &mut session.game;
        Self::transition(game, GamePhase::Setup)?;

        game.game_started = false;
        game.players.clear();
        game.current_word.clear();
        game.current_hints.clear();
        game.current_category.clear();
        game.current_reveal_index = 0;
        game.revealed_players.clear();
        Ok(())
    }

    /// The word, category and impostors of the finished round
    pub async fn results(&self) -> GameResult<RoundResults> {
        let session = self.session.read().await;
        let game = &session.game;
        Self::require_phase(game, GamePhase::Results)?;

        Ok(RoundResults {
            word: game.current_word.clone(),
            category: game.current_category.clone(),
            impostors: game
                .players
                .iter()
                .filter(|p| p.is_impostor())
                .cloned()
                .collect(),
        })
    }
}

fn reveal_complete(game: &GameState) -> bool {
    !game.players.is_empty() && game.revealed_players.len() == game.players.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::StaticTranslator;
    use crate::llm::{LlmError, LlmResult};
    use crate::words::{MemoryWordCache, WordGenerator, WordRequest, WordService};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;

    fn en() -> StaticTranslator {
        StaticTranslator::new(Locale::En)
    }

    async fn ready_state(players: usize, impostors: usize) -> AppState {
        let state = AppState::new();
        state.set_language(Locale::En).await.unwrap();
        state.set_player_count(players, &en()).await.unwrap();
        state.set_impostor_count(impostors).await.unwrap();
        state.toggle_category("animals").await.unwrap();
        state
    }

    async fn reveal_all(state: &AppState) {
        let total = state.get_game().await.players.len();
        for i in 0..total {
            state.reveal_card(i).await.unwrap();
            state.next_reveal_player().await.unwrap();
        }
    }

    #[test]
    fn test_phase_transitions() {
        use GamePhase::*;

        assert!(AppState::is_valid_phase_transition(Setup, WordReveal));
        assert!(AppState::is_valid_phase_transition(WordReveal, Discussion));
        assert!(AppState::is_valid_phase_transition(Discussion, Results));
        assert!(AppState::is_valid_phase_transition(Results, Setup));

        assert!(!AppState::is_valid_phase_transition(Setup, Discussion));
        assert!(!AppState::is_valid_phase_transition(WordReveal, Setup));
        assert!(!AppState::is_valid_phase_transition(Discussion, Setup));
        assert!(!AppState::is_valid_phase_transition(Results, WordReveal));
        assert!(!AppState::is_valid_phase_transition(Setup, Setup));

        assert_eq!(AppState::get_valid_transitions(Results), vec![Setup]);
        assert_eq!(AppState::get_valid_transitions(Setup), vec![WordReveal]);
    }

    #[tokio::test]
    async fn test_start_game_without_category_changes_nothing() {
        let state = AppState::new();
        let before = state.get_session().await;

        let result = state.start_game(&en()).await;

        assert_eq!(result, Err(GameError::NoCategorySelected));
        assert_eq!(state.get_session().await, before);
    }

    #[tokio::test]
    async fn test_start_game_publishes_round() {
        let state = ready_state(6, 2).await;
        state.set_player_name(0, "Anna".to_string()).await.unwrap();

        let game = state.start_game(&en()).await.unwrap();

        assert_eq!(game.phase, GamePhase::WordReveal);
        assert!(game.game_started);
        assert_eq!(game.players.len(), 6);
        assert_eq!(game.players[0].name, "Anna");
        assert_eq!(game.players[1].name, "Player 2");
        assert_eq!(game.players.iter().filter(|p| p.is_impostor()).count(), 2);
        assert_eq!(game.current_category, "animals");
        assert!(!game.current_word.is_empty());
        assert_eq!(game.current_hints.len(), 4);
        assert_eq!(game.current_reveal_index, 0);
        assert_eq!(state.get_game().await, game);
    }

    #[tokio::test]
    async fn test_impostor_count_holds_for_every_table() {
        for total in MIN_PLAYERS..=MAX_PLAYERS {
            for impostors in 1..=total / 3 {
                let state = ready_state(total, impostors).await;
                let game = state.start_game(&en()).await.unwrap();

                let count = game.players.iter().filter(|p| p.is_impostor()).count();
                assert_eq!(count, impostors, "{} players", total);
                assert_eq!(game.players.len() - count, total - impostors);
            }
        }
    }

    #[tokio::test]
    async fn test_start_game_twice_is_rejected() {
        let state = ready_state(3, 1).await;
        state.start_game(&en()).await.unwrap();

        let err = state.start_game(&en()).await.unwrap_err();
        assert_eq!(
            err,
            GameError::InvalidTransition {
                from: GamePhase::WordReveal,
                to: GamePhase::WordReveal
            }
        );
    }

    struct SlowGenerator;

    #[async_trait]
    impl WordGenerator for SlowGenerator {
        async fn generate_words(&self, _request: &WordRequest) -> LlmResult<Vec<WordWithHints>> {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Err(LlmError::ApiError("offline".to_string()))
        }
    }

    #[tokio::test]
    async fn test_concurrent_start_is_single_flight() {
        let words = WordService::new(
            Arc::new(MemoryWordCache::new()),
            Some(Arc::new(SlowGenerator)),
        );
        let state = AppState::with_words(Arc::new(words));
        state.set_language(Locale::En).await.unwrap();
        state.toggle_category("food").await.unwrap();

        let translator = en();
        let (first, second) = tokio::join!(state.start_game(&translator), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            state.start_game(&translator).await
        });

        assert!(first.is_ok());
        assert_eq!(second, Err(GameError::StartInProgress));
        assert_eq!(state.get_game().await.phase, GamePhase::WordReveal);
    }

    #[tokio::test]
    async fn test_setup_edits_are_refused_while_dealing() {
        let words = WordService::new(
            Arc::new(MemoryWordCache::new()),
            Some(Arc::new(SlowGenerator)),
        );
        let state = AppState::with_words(Arc::new(words));
        state.set_language(Locale::En).await.unwrap();
        state.toggle_category("animals").await.unwrap();

        let translator = en();
        let (started, resized, untoggled, imported) = tokio::join!(
            state.start_game(&translator),
            async {
                tokio::time::sleep(Duration::from_millis(20)).await;
                state.set_player_count(7, &translator).await
            },
            async {
                tokio::time::sleep(Duration::from_millis(30)).await;
                state.toggle_category("animals").await
            },
            async {
                tokio::time::sleep(Duration::from_millis(40)).await;
                let mut config = state.export_config().await;
                config.total_players = 5;
                state.import_config(config).await
            }
        );

        let game = started.unwrap();
        assert_eq!(resized, Err(GameError::StartInProgress));
        assert_eq!(untoggled, Err(GameError::StartInProgress));
        assert_eq!(imported, Err(GameError::StartInProgress));

        let current = state.get_game().await;
        assert_eq!(current, game);
        assert_eq!(current.players.len(), current.total_players);
        assert_eq!(current.selected_categories, vec!["animals"]);
        assert_eq!(current.current_category, "animals");
    }

    #[tokio::test]
    async fn test_setup_edits_resume_after_failed_start() {
        let state = AppState::new();
        assert_eq!(state.start_game(&en()).await, Err(GameError::NoCategorySelected));

        assert!(state.set_player_count(5, &en()).await.is_ok());
        assert!(state.toggle_category("food").await.is_ok());
    }

    #[tokio::test]
    async fn test_operations_from_wrong_phase_are_rejected() {
        let state = ready_state(4, 1).await;
        let before = state.get_session().await;

        assert!(state.start_discussion().await.is_err());
        assert!(state.end_game().await.is_err());
        assert!(state.new_game().await.is_err());
        assert!(state.next_reveal_player().await.is_err());
        assert!(state.reveal_card(0).await.is_err());
        assert!(state.results().await.is_err());
        assert_eq!(state.get_session().await, before);

        state.start_game(&en()).await.unwrap();
        assert_eq!(
            state.set_player_count(5, &en()).await,
            Err(GameError::NotInSetup(GamePhase::WordReveal))
        );
        assert!(state.toggle_category("food").await.is_err());
        assert!(state.end_game().await.is_err());
    }

    #[tokio::test]
    async fn test_discussion_requires_every_card_seen() {
        let state = ready_state(3, 1).await;
        state.start_game(&en()).await.unwrap();

        state.reveal_card(0).await.unwrap();
        state.reveal_card(0).await.unwrap();
        assert!(!state.is_reveal_complete().await);
        assert_eq!(
            state.start_discussion().await,
            Err(GameError::RevealIncomplete {
                revealed: 1,
                total: 3
            })
        );

        state.reveal_card(1).await.unwrap();
        state.reveal_card(2).await.unwrap();
        assert!(state.is_reveal_complete().await);
        assert!(state.start_discussion().await.is_ok());
    }

    #[tokio::test]
    async fn test_reveal_cards_match_roles() {
        let state = ready_state(6, 2).await;
        let game = state.start_game(&en()).await.unwrap();

        for (i, player) in game.players.iter().enumerate() {
            match state.reveal_card(i).await.unwrap() {
                RevealCard::Player { word, category, .. } => {
                    assert!(!player.is_impostor());
                    assert_eq!(word, game.current_word);
                    assert_eq!(category, "animals");
                }
                RevealCard::Impostor { hint, .. } => {
                    assert!(player.is_impostor());
                    let hint = hint.unwrap();
                    assert!(game.current_hints.contains(&hint));
                }
            }
        }
        assert!(matches!(
            state.reveal_card(6).await,
            Err(GameError::InvalidPlayerIndex(6))
        ));
    }

    #[tokio::test]
    async fn test_impostor_gets_no_hint_when_disabled() {
        let state = ready_state(3, 1).await;
        state.toggle_hints().await.unwrap();
        let game = state.start_game(&en()).await.unwrap();

        let idx = game.players.iter().position(|p| p.is_impostor()).unwrap();
        match state.reveal_card(idx).await.unwrap() {
            RevealCard::Impostor { hint, .. } => assert!(hint.is_none()),
            other => panic!("Expected impostor card, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_full_round_and_new_game_keeps_config() {
        let state = ready_state(5, 1).await;
        state.toggle_category("food").await.unwrap();
        state.add_custom_category("Cars").await.unwrap();
        state.set_player_name(1, "Ben".to_string()).await.unwrap();

        state.start_game(&en()).await.unwrap();
        reveal_all(&state).await;
        assert_eq!(state.get_game().await.current_reveal_index, 5);

        state.start_discussion().await.unwrap();
        assert_eq!(state.get_game().await.phase, GamePhase::Discussion);

        state.end_game().await.unwrap();
        let results = state.results().await.unwrap();
        assert_eq!(results.impostors.len(), 1);
        assert_eq!(results.word, state.get_game().await.current_word);

        state.new_game().await.unwrap();
        let session = state.get_session().await;
        let game = &session.game;
        assert_eq!(game.phase, GamePhase::Setup);
        assert!(!game.game_started);
        assert!(game.players.is_empty());
        assert!(game.current_word.is_empty());
        assert!(game.current_hints.is_empty());
        assert!(game.current_category.is_empty());
        assert_eq!(game.current_reveal_index, 0);
        assert!(game.revealed_players.is_empty());

        assert_eq!(game.total_players, 5);
        assert_eq!(game.impostor_count, 1);
        assert_eq!(game.language, Locale::En);
        assert_eq!(game.selected_categories, vec!["animals", "food", "Cars"]);
        assert_eq!(session.custom_categories, vec!["Cars"]);
        assert_eq!(session.player_names[1], "Ben");
    }
}
