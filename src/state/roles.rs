//! Roster creation and impostor assignment

use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;

use crate::i18n::Translator;
use crate::types::{CategoryId, Player, PlayerId, PlayerRole};

/// Default name for the player at `index` (0-based), e.g. "Player 3"
pub fn default_player_name(translator: &dyn Translator, index: usize) -> String {
    format!("{} {}", translator.translate("player"), index + 1)
}

/// Create `total` players with ids 1..=total, all regular players.
/// Missing or empty names fall back to the default name.
pub fn build_roster(names: &[String], total: usize, translator: &dyn Translator) -> Vec<Player> {
    (0..total)
        .map(|i| {
            let name = names
                .get(i)
                .map(|n| n.trim())
                .filter(|n| !n.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| default_player_name(translator, i));
            Player {
                id: (i + 1) as PlayerId,
                name,
                role: PlayerRole::Player,
            }
        })
        .collect()
}

/// Mark exactly `impostor_count` players as impostors, chosen uniformly
/// without replacement (Fisher-Yates shuffle of the indices).
pub fn assign_impostors<R: Rng + ?Sized>(players: &mut [Player], impostor_count: usize, rng: &mut R) {
    let mut indices: Vec<usize> = (0..players.len()).collect();
    indices.shuffle(rng);

    for &i in indices.iter().take(impostor_count) {
        players[i].role = PlayerRole::Impostor;
    }
}

/// Uniformly pick one of the selected categories
pub fn choose_category<'a, R: Rng + ?Sized>(
    categories: &'a [CategoryId],
    rng: &mut R,
) -> Option<&'a CategoryId> {
    categories.choose(rng)
}
