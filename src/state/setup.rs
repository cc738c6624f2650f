//! Setup-phase configuration: players, impostors, language, categories

use super::roles::default_player_name;
use super::{AppState, GameError, GameResult};
use crate::i18n::Translator;
use crate::types::*;

/// Most impostors a table of `total_players` keeps when it shrinks
pub fn impostor_cap(total_players: usize) -> usize {
    total_players / 3
}

impl AppState {
    /// Resize the table. Existing names are kept by index, new slots get a
    /// default name, and the impostor count is clamped down if needed.
    pub async fn set_player_count(&self, count: usize, translator: &dyn Translator) -> GameResult<()> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&count) {
            return Err(GameError::InvalidPlayerCount(count));
        }

        self.mutate_setup(|session| {
            let names: Vec<String> = (0..count)
                .map(|i| match session.player_names.get(i) {
                    Some(name) if !name.is_empty() => name.clone(),
                    _ => default_player_name(translator, i),
                })
                .collect();

            session.player_names = names;
            session.game.total_players = count;
            session.game.impostor_count = session.game.impostor_count.min(impostor_cap(count));
            Ok(())
        })
        .await?;

        tracing::debug!("Player count set to {}", count);
        Ok(())
    }

    /// Set a name in the working buffer, growing it if the index is past the end
    pub async fn set_player_name(&self, index: usize, name: String) -> GameResult<()> {
        if index >= MAX_PLAYERS {
            return Err(GameError::InvalidPlayerIndex(index));
        }

        self.mutate_setup(|session| {
            if session.player_names.len() <= index {
                session.player_names.resize(index + 1, String::new());
            }
            session.player_names[index] = name;
            Ok(())
        })
        .await
    }

    pub async fn set_impostor_count(&self, count: usize) -> GameResult<()> {
        self.mutate_setup(|session| {
            let max = session.game.total_players.saturating_sub(1);
            if count == 0 || count > max {
                return Err(GameError::InvalidImpostorCount { count, max });
            }
            session.game.impostor_count = count;
            Ok(())
        })
        .await
    }

    /// Change the language of future words; already selected categories stay
    pub async fn set_language(&self, language: Locale) -> GameResult<()> {
        self.mutate_setup(|session| {
            session.game.language = language;
            Ok(())
        })
        .await
    }

    /// Select the category if absent, deselect it if present
    pub async fn toggle_category(&self, category: &str) -> GameResult<()> {
        self.mutate_setup(|session| {
            let selected = &mut session.game.selected_categories;
            match selected.iter().position(|c| c == category) {
                Some(pos) => {
                    selected.remove(pos);
                }
                None => selected.push(category.to_string()),
            }
            Ok(())
        })
        .await
    }

    /// Add a user-defined category and select it. Blank names are ignored.
    pub async fn add_custom_category(&self, name: &str) -> GameResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(());
        }

        self.mutate_setup(|session| {
            if !session.custom_categories.iter().any(|c| c == name) {
                session.custom_categories.push(name.to_string());
            }
            session.game.selected_categories.push(name.to_string());
            session.game.custom_category.clear();
            Ok(())
        })
        .await?;

        tracing::info!("Added custom category '{}'", name);
        Ok(())
    }

    /// Forget a user-defined category and drop it from the selection
    pub async fn remove_custom_category(&self, name: &str) -> GameResult<()> {
        self.mutate_setup(|session| {
            session.custom_categories.retain(|c| c != name);
            session.game.selected_categories.retain(|c| c != name);
            Ok(())
        })
        .await
    }

    /// Update the "add category" input buffer
    pub async fn set_custom_category(&self, text: String) -> GameResult<()> {
        self.mutate_setup(|session| {
            session.game.custom_category = text;
            Ok(())
        })
        .await
    }

    pub async fn toggle_hints(&self) -> GameResult<()> {
        self.mutate_setup(|session| {
            session.game.show_hints_to_impostors = !session.game.show_hints_to_impostors;
            Ok(())
        })
        .await
    }

    /// Built-in categories followed by the custom ones
    pub async fn all_categories(&self) -> Vec<CategoryId> {
        let session = self.session.read().await;
        BUILTIN_CATEGORIES
            .iter()
            .map(|c| c.to_string())
            .chain(session.custom_categories.iter().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::StaticTranslator;

    fn en() -> StaticTranslator {
        StaticTranslator::new(Locale::En)
    }

    #[tokio::test]
    async fn test_set_player_count_keeps_names_below_new_count() {
        let state = AppState::new();
        state.set_player_count(5, &en()).await.unwrap();
        state.set_player_name(0, "Anna".to_string()).await.unwrap();
        state.set_player_name(3, "Dave".to_string()).await.unwrap();
        state.set_player_name(4, "Eve".to_string()).await.unwrap();

        state.set_player_count(4, &en()).await.unwrap();
        let session = state.get_session().await;
        assert_eq!(
            session.player_names,
            vec!["Anna", "Player 2", "Player 3", "Dave"]
        );
        assert_eq!(session.game.total_players, 4);

        state.set_player_count(6, &en()).await.unwrap();
        let session = state.get_session().await;
        assert_eq!(session.player_names[3], "Dave");
        assert_eq!(session.player_names[4], "Player 5");
        assert_eq!(session.player_names[5], "Player 6");
    }

    #[tokio::test]
    async fn test_set_player_count_rejects_out_of_range() {
        let state = AppState::new();
        assert_eq!(
            state.set_player_count(2, &en()).await,
            Err(GameError::InvalidPlayerCount(2))
        );
        assert_eq!(
            state.set_player_count(11, &en()).await,
            Err(GameError::InvalidPlayerCount(11))
        );
        assert_eq!(state.get_game().await.total_players, 3);
    }

    #[tokio::test]
    async fn test_shrinking_clamps_impostors_but_never_raises_them() {
        let state = AppState::new();
        state.set_player_count(10, &en()).await.unwrap();
        state.set_impostor_count(3).await.unwrap();

        state.set_player_count(7, &en()).await.unwrap();
        assert_eq!(state.get_game().await.impostor_count, 2);

        state.set_player_count(10, &en()).await.unwrap();
        assert_eq!(state.get_game().await.impostor_count, 2);
    }

    #[tokio::test]
    async fn test_set_impostor_count_bounds() {
        let state = AppState::new();
        state.set_player_count(4, &en()).await.unwrap();

        assert!(state.set_impostor_count(3).await.is_ok());
        assert_eq!(
            state.set_impostor_count(4).await,
            Err(GameError::InvalidImpostorCount { count: 4, max: 3 })
        );
        assert!(state.set_impostor_count(0).await.is_err());
        assert_eq!(state.get_game().await.impostor_count, 3);
    }

    #[tokio::test]
    async fn test_set_player_name_extends_buffer() {
        let state = AppState::new();
        state.set_player_name(2, "Cleo".to_string()).await.unwrap();

        let session = state.get_session().await;
        assert_eq!(session.player_names, vec!["", "", "Cleo"]);
        assert_eq!(
            state.set_player_name(MAX_PLAYERS, "X".to_string()).await,
            Err(GameError::InvalidPlayerIndex(MAX_PLAYERS))
        );
    }

    #[tokio::test]
    async fn test_toggle_category_is_its_own_inverse() {
        let state = AppState::new();
        for c in ["animals", "food", "places"] {
            state.toggle_category(c).await.unwrap();
        }

        state.toggle_category("food").await.unwrap();
        assert_eq!(
            state.get_game().await.selected_categories,
            vec!["animals", "places"]
        );

        state.toggle_category("food").await.unwrap();
        state.toggle_category("food").await.unwrap();
        assert_eq!(
            state.get_game().await.selected_categories,
            vec!["animals", "places"]
        );
    }

    #[tokio::test]
    async fn test_blank_custom_category_is_a_no_op() {
        let state = AppState::new();
        state.set_custom_category("draft".to_string()).await.unwrap();
        let before = state.get_session().await;

        state.add_custom_category("").await.unwrap();
        state.add_custom_category("   ").await.unwrap();

        assert_eq!(state.get_session().await, before);
    }

    #[tokio::test]
    async fn test_custom_category_added_once_but_selected_each_time() {
        let state = AppState::new();
        state.set_custom_category("Movies2".to_string()).await.unwrap();

        state.add_custom_category("Movies2").await.unwrap();
        state.add_custom_category("Movies2").await.unwrap();

        let session = state.get_session().await;
        assert_eq!(session.custom_categories, vec!["Movies2"]);
        assert_eq!(session.game.selected_categories, vec!["Movies2", "Movies2"]);
        assert!(session.game.custom_category.is_empty());
    }

    #[tokio::test]
    async fn test_remove_custom_category() {
        let state = AppState::new();
        state.add_custom_category("Board Games").await.unwrap();
        state.toggle_category("food").await.unwrap();

        state.remove_custom_category("Board Games").await.unwrap();

        let session = state.get_session().await;
        assert!(session.custom_categories.is_empty());
        assert_eq!(session.game.selected_categories, vec!["food"]);
    }

    #[tokio::test]
    async fn test_language_and_hints() {
        let state = AppState::new();
        state.toggle_category("animals").await.unwrap();
        state.set_language(Locale::En).await.unwrap();
        state.toggle_hints().await.unwrap();

        let game = state.get_game().await;
        assert_eq!(game.language, Locale::En);
        assert!(!game.show_hints_to_impostors);
        assert_eq!(game.selected_categories, vec!["animals"]);
    }

    #[tokio::test]
    async fn test_all_categories_lists_builtins_then_custom() {
        let state = AppState::new();
        state.add_custom_category("Cars").await.unwrap();

        let all = state.all_categories().await;
        assert_eq!(all.len(), BUILTIN_CATEGORIES.len() + 1);
        assert_eq!(all.first().map(String::as_str), Some("animals"));
        assert_eq!(all.last().map(String::as_str), Some("Cars"));
    }

    #[test]
    fn test_impostor_cap() {
        assert_eq!(impostor_cap(3), 1);
        assert_eq!(impostor_cap(5), 1);
        assert_eq!(impostor_cap(6), 2);
        assert_eq!(impostor_cap(10), 3);
    }
}
