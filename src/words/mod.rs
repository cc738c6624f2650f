//! Word acquisition.
//!
//! Resolves a secret word for a category through, in order: the local cache
//! (consume-once), a remote generator (the rest of the batch is cached), the
//! static fallback table, and finally a fixed placeholder. The public entry
//! point never fails.

pub mod cache;
pub mod fallback;
pub mod generator;

use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::llm::LlmError;
use crate::types::{Locale, WordSet, WordSetUpdate, WordWithHints};

pub use cache::{open_word_cache, CacheError, JsonFileWordCache, MemoryWordCache, WordCache};
pub use generator::{LlmWordGenerator, WordGenerator, WordRequest};

/// Words requested from the generator per batch
pub const GENERATION_BATCH_SIZE: usize = 15;

/// Upper bound on a remote generation round-trip
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(8);

/// Failures inside the acquisition chain; each one just moves on to the next source
#[derive(Debug, thiserror::Error)]
pub enum WordError {
    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Generation(#[from] LlmError),

    #[error("Word generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Generator returned no words")]
    EmptyBatch,

    #[error("No word generator configured")]
    NoGenerator,
}

type CacheKey = (String, Locale);

pub struct WordService {
    cache: Arc<dyn WordCache>,
    generator: Option<Arc<dyn WordGenerator>>,
    generation_timeout: Duration,
    batch_size: usize,
    /// Serializes read-modify-write per (category, language)
    key_locks: Mutex<HashMap<CacheKey, Arc<Mutex<()>>>>,
}

impl WordService {
    pub fn new(cache: Arc<dyn WordCache>, generator: Option<Arc<dyn WordGenerator>>) -> Self {
        Self {
            cache,
            generator,
            generation_timeout: DEFAULT_GENERATION_TIMEOUT,
            batch_size: GENERATION_BATCH_SIZE,
            key_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = timeout;
        self
    }

    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    pub fn generator(&self) -> Option<&Arc<dyn WordGenerator>> {
        self.generator.as_ref()
    }

    pub fn cache(&self) -> &Arc<dyn WordCache> {
        &self.cache
    }

    async fn key_lock(&self, key: &CacheKey) -> Arc<Mutex<()>> {
        self.key_locks
            .lock()
            .await
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Get a word with hints for the category. Always returns a word.
    pub async fn get_random_word_with_hints(&self, category: &str, language: Locale) -> WordWithHints {
        let key: CacheKey = (category.to_lowercase(), language);
        let lock = self.key_lock(&key).await;
        let guard = lock.lock().await;

        let word = self.resolve_word(category, &key).await;

        drop(guard);
        self.release_key_lock(&key, lock).await;
        word
    }

    /// Drop the per-key lock once nobody else holds or waits on it
    async fn release_key_lock(&self, key: &CacheKey, lock: Arc<Mutex<()>>) {
        let mut locks = self.key_locks.lock().await;
        // One reference in the map plus ours: no other caller for this key
        if Arc::strong_count(&lock) == 2 {
            locks.remove(key);
        }
    }

    async fn resolve_word(&self, category: &str, key: &CacheKey) -> WordWithHints {
        let language = key.1;

        match self.take_from_cache(&key.0, language).await {
            Ok(Some(word)) => return word,
            Ok(None) => {}
            Err(e) => tracing::warn!("Word cache lookup failed for {}/{}: {}", language, key.0, e),
        }

        match self.generate_and_cache(category, &key.0, language).await {
            Ok(word) => return word,
            Err(WordError::NoGenerator) => {}
            Err(e) => tracing::warn!(
                "Word generation failed for {}/{}: {}, using fallback words",
                language,
                key.0,
                e
            ),
        }

        fallback::random_word(language, &key.0).unwrap_or_else(|| {
            tracing::info!("No fallback words for {}/{}, using placeholder", language, key.0);
            fallback::placeholder(language)
        })
    }

    /// Consume one random word from the cached set, deleting the set once drained
    async fn take_from_cache(
        &self,
        category: &str,
        language: Locale,
    ) -> Result<Option<WordWithHints>, WordError> {
        let Some(set) = self.cache.find_one(category, language).await? else {
            return Ok(None);
        };
        if set.words_with_hints.is_empty() {
            return Ok(None);
        }

        let mut remaining = set.words_with_hints;
        let picked = remaining.swap_remove(random_index(remaining.len()));

        if remaining.is_empty() {
            self.cache.delete(&set.id).await?;
            tracing::info!("Drained cached word set {}", set.id);
        } else {
            let left = remaining.len();
            self.cache
                .update(
                    &set.id,
                    WordSetUpdate {
                        words_with_hints: Some(remaining),
                        usage_count: Some(set.usage_count + 1),
                    },
                )
                .await?;
            tracing::debug!("Took cached word from {}, {} left", set.id, left);
        }

        Ok(Some(picked))
    }

    /// Ask the generator for a batch, return one word and cache the rest
    async fn generate_and_cache(
        &self,
        category: &str,
        category_key: &str,
        language: Locale,
    ) -> Result<WordWithHints, WordError> {
        let generator = self.generator.as_ref().ok_or(WordError::NoGenerator)?;

        let request = WordRequest {
            category: category.to_string(),
            language,
            count: self.batch_size,
        };

        let mut words = tokio::time::timeout(self.generation_timeout, generator.generate_words(&request))
            .await
            .map_err(|_| WordError::Timeout(self.generation_timeout))??;

        if words.is_empty() {
            return Err(WordError::EmptyBatch);
        }

        let picked = words.swap_remove(random_index(words.len()));

        if !words.is_empty() {
            let word_set = WordSet {
                id: format!("{}-{}-{}", category_key, language, ulid::Ulid::new()),
                category: category_key.to_string(),
                language,
                words_with_hints: words,
                created_at: chrono::Utc::now(),
                usage_count: 1,
            };
            // The picked word is still good even if caching the rest fails
            match self.cache.add(word_set).await {
                Ok(id) => tracing::info!("Cached generated word set {}", id),
                Err(e) => tracing::warn!("Failed to cache generated words: {}", e),
            }
        }

        Ok(picked)
    }
}

fn random_index(len: usize) -> usize {
    rand::rng().random_range(0..len)
}
