//! Local word cache.
//!
//! Stores batches of generated words keyed by (category, language). Every
//! operation is atomic from the caller's point of view: the backing
//! collection sits behind a single lock and file writes go through a
//! temp-file + rename.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::types::{Locale, WordSet, WordSetId, WordSetUpdate};

pub type CacheResult<T> = Result<T, CacheError>;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache file is corrupt: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Word set '{0}' not found")]
    NotFound(WordSetId),

    #[error("Word set '{0}' already exists")]
    DuplicateId(WordSetId),
}

/// Persistent keyed store of word sets
#[async_trait]
pub trait WordCache: Send + Sync {
    /// Exact-match lookup on the (category, language) pair
    async fn find_one(&self, category: &str, language: Locale) -> CacheResult<Option<WordSet>>;

    /// Insert a new record. An empty id is replaced by a generated one.
    async fn add(&self, word_set: WordSet) -> CacheResult<WordSetId>;

    /// Merge the given fields into an existing record
    async fn update(&self, id: &str, update: WordSetUpdate) -> CacheResult<()>;

    async fn delete(&self, id: &str) -> CacheResult<()>;
}

fn insert_set(sets: &mut Vec<WordSet>, mut word_set: WordSet) -> CacheResult<WordSetId> {
    if word_set.id.is_empty() {
        word_set.id = ulid::Ulid::new().to_string();
    }
    if sets.iter().any(|s| s.id == word_set.id) {
        return Err(CacheError::DuplicateId(word_set.id));
    }
    let id = word_set.id.clone();
    sets.push(word_set);
    Ok(id)
}

fn apply_update(sets: &mut [WordSet], id: &str, update: WordSetUpdate) -> CacheResult<()> {
    let set = sets
        .iter_mut()
        .find(|s| s.id == id)
        .ok_or_else(|| CacheError::NotFound(id.to_string()))?;
    if let Some(words) = update.words_with_hints {
        set.words_with_hints = words;
    }
    if let Some(usage_count) = update.usage_count {
        set.usage_count = usage_count;
    }
    Ok(())
}

fn remove_set(sets: &mut Vec<WordSet>, id: &str) -> CacheResult<()> {
    let pos = sets
        .iter()
        .position(|s| s.id == id)
        .ok_or_else(|| CacheError::NotFound(id.to_string()))?;
    sets.remove(pos);
    Ok(())
}

fn find_set(sets: &[WordSet], category: &str, language: Locale) -> Option<WordSet> {
    sets.iter()
        .find(|s| s.category == category && s.language == language)
        .cloned()
}

/// Cache that lives only as long as the process
#[derive(Debug, Clone, Default)]
pub struct MemoryWordCache {
    sets: Arc<RwLock<Vec<WordSet>>>,
}

impl MemoryWordCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.sets.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sets.read().await.is_empty()
    }
}

#[async_trait]
impl WordCache for MemoryWordCache {
    async fn find_one(&self, category: &str, language: Locale) -> CacheResult<Option<WordSet>> {
        Ok(find_set(&self.sets.read().await, category, language))
    }

    async fn add(&self, word_set: WordSet) -> CacheResult<WordSetId> {
        insert_set(&mut *self.sets.write().await, word_set)
    }

    async fn update(&self, id: &str, update: WordSetUpdate) -> CacheResult<()> {
        apply_update(&mut self.sets.write().await, id, update)
    }

    async fn delete(&self, id: &str) -> CacheResult<()> {
        remove_set(&mut *self.sets.write().await, id)
    }
}

/// Cache persisted as a JSON array on disk
#[derive(Debug)]
pub struct JsonFileWordCache {
    path: PathBuf,
    sets: RwLock<Vec<WordSet>>,
}

impl JsonFileWordCache {
    /// Open the cache file, starting empty if it does not exist yet
    pub async fn open(path: impl AsRef<Path>) -> CacheResult<Self> {
        let path = path.as_ref().to_path_buf();
        let sets = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        tracing::info!(
            "Opened word cache at {} ({} word sets)",
            path.display(),
            sets.len()
        );
        Ok(Self {
            path,
            sets: RwLock::new(sets),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the full collection. Called with the write lock held.
    async fn flush(&self, sets: &[WordSet]) -> CacheResult<()> {
        write_json_atomic(&self.path, &serde_json::to_vec_pretty(sets)?).await
    }

    /// Apply a mutation to a copy, persist it, then publish it in memory.
    /// A failed write leaves both disk and memory untouched.
    async fn mutate<T>(
        &self,
        op: impl FnOnce(&mut Vec<WordSet>) -> CacheResult<T>,
    ) -> CacheResult<T> {
        let mut sets = self.sets.write().await;
        let mut next = sets.clone();
        let out = op(&mut next)?;
        self.flush(&next).await?;
        *sets = next;
        Ok(out)
    }
}

#[async_trait]
impl WordCache for JsonFileWordCache {
    async fn find_one(&self, category: &str, language: Locale) -> CacheResult<Option<WordSet>> {
        Ok(find_set(&self.sets.read().await, category, language))
    }

    async fn add(&self, word_set: WordSet) -> CacheResult<WordSetId> {
        self.mutate(|sets| insert_set(sets, word_set)).await
    }

    async fn update(&self, id: &str, update: WordSetUpdate) -> CacheResult<()> {
        self.mutate(|sets| apply_update(sets, id, update)).await
    }

    async fn delete(&self, id: &str) -> CacheResult<()> {
        self.mutate(|sets| remove_set(sets, id)).await
    }
}

/// Open the on-disk cache at `path`, or an in-memory cache when the file
/// cannot be read
pub async fn open_word_cache(path: impl AsRef<Path>) -> Arc<dyn WordCache> {
    let path = path.as_ref();
    match JsonFileWordCache::open(path).await {
        Ok(cache) => Arc::new(cache),
        Err(e) => {
            tracing::warn!(
                "Failed to open word cache {}: {}. Using in-memory cache.",
                path.display(),
                e
            );
            Arc::new(MemoryWordCache::new())
        }
    }
}

/// Write `bytes` next to `path` and rename over it
pub(crate) async fn write_json_atomic(path: &Path, bytes: &[u8]) -> CacheResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
