mod error;
mod game;
pub mod persist;
pub mod roles;
mod setup;

pub use error::GameError;

use crate::protocol::ServerMessage;
use crate::types::*;
use crate::words::{MemoryWordCache, WordService};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex, RwLock};

pub type GameResult<T> = Result<T, GameError>;

/// The game session owned by the hosting application.
///
/// Cheap to clone; all clones share the same session.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<RwLock<Session>>,
    pub words: Arc<WordService>,
    /// Held for the whole of `start_game`
    start_lock: Arc<Mutex<()>>,
    /// True while `start_game` is dealing; setup edits are refused meanwhile
    starting: Arc<AtomicBool>,
    /// Set once a language came from a client or a stored config
    locale_seeded: Arc<AtomicBool>,
    /// Broadcast channel for state updates to connected clients
    pub broadcast: broadcast::Sender<ServerMessage>,
}

impl AppState {
    /// Session backed by an in-memory cache and no word generator
    pub fn new() -> Self {
        Self::with_words(Arc::new(WordService::new(
            Arc::new(MemoryWordCache::new()),
            None,
        )))
    }

    pub fn with_words(words: Arc<WordService>) -> Self {
        let (tx, _rx) = broadcast::channel(100);
        Self {
            session: Arc::new(RwLock::new(Session::default())),
            words,
            start_lock: Arc::new(Mutex::new(())),
            starting: Arc::new(AtomicBool::new(false)),
            locale_seeded: Arc::new(AtomicBool::new(false)),
            broadcast: tx,
        }
    }

    /// Snapshot of the game state
    pub async fn get_game(&self) -> GameState {
        self.session.read().await.game.clone()
    }

    /// Snapshot of game state plus setup buffers
    pub async fn get_session(&self) -> Session {
        self.session.read().await.clone()
    }

    /// Send the current session to every connected client
    pub async fn broadcast_state(&self) {
        let session = self.get_session().await;
        // Ignore send errors (no receivers connected is fine)
        let _ = self.broadcast.send(ServerMessage::State { session });
    }

    /// Adopt a detected locale, but only for the first client and only if no
    /// language has been restored from disk. Returns whether it was applied.
    pub async fn seed_language(&self, locale: Locale) -> bool {
        if self.locale_seeded.load(Ordering::SeqCst) {
            return false;
        }
        if let Err(e) = self.set_language(locale).await {
            tracing::debug!("Not seeding language {}: {}", locale, e);
            return false;
        }
        let first = self
            .locale_seeded
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        if first {
            tracing::debug!("Language seeded from client: {}", locale);
        }
        first
    }

    pub(crate) fn mark_locale_seeded(&self) {
        self.locale_seeded.store(true, Ordering::SeqCst);
    }

    /// Apply a mutation under the write lock, after checking the phase is
    /// setup and no round is being dealt from the current configuration
    async fn mutate_setup<T>(
        &self,
        op: impl FnOnce(&mut Session) -> GameResult<T>,
    ) -> GameResult<T> {
        let mut session = self.session.write().await;
        if session.game.phase != GamePhase::Setup {
            return Err(GameError::NotInSetup(session.game.phase));
        }
        if self.starting.load(Ordering::SeqCst) {
            return Err(GameError::StartInProgress);
        }
        op(&mut session)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
