use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mathpace_core::model::{BadgeSet, DailyBestMap, ProblemResult, SessionRecord, merge_record};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Keys of the four persisted collections.
///
/// These names are the wire contract with previously exported data; renaming
/// one silently orphans everything stored under the old name.
pub mod keys {
    pub const RESULTS: &str = "results";
    pub const RECORDS: &str = "records";
    pub const BADGES: &str = "badges";
    pub const DAILY_BESTS: &str = "dailyBests";
}

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Key-value blob store contract.
///
/// The surface is deliberately whole-document: each key holds one JSON blob
/// that is read and replaced atomically. An absent key reads as `None`; the
/// typed facade maps that to the collection's empty default.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Fetch the blob stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;

    /// Store `value` under `key`, replacing any previous blob.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError>;
}

/// Simple in-memory store implementation for testing and prototyping.
///
/// Counts `set` calls so tests can assert how many writes an operation
/// actually performed.
#[derive(Default)]
pub struct InMemoryStore {
    blobs: Mutex<HashMap<String, Value>>,
    writes: AtomicUsize,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of `set` calls observed so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KvStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let guard = self
            .blobs
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        let mut guard = self
            .blobs
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), value);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Typed facade over the blob store for the tracked collections.
///
/// Reads are get-with-defaults: a missing key is an empty history, an empty
/// record board, no badges, no daily bests.
#[derive(Clone)]
pub struct TrackerStore {
    kv: Arc<dyn KvStore>,
}

impl TrackerStore {
    #[must_use]
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryStore::new()))
    }

    async fn read_or_default<T>(&self, key: &str) -> Result<T, StorageError>
    where
        T: DeserializeOwned + Default,
    {
        match self.kv.get(key).await? {
            Some(value) => serde_json::from_value(value)
                .map_err(|e| StorageError::Serialization(e.to_string())),
            None => Ok(T::default()),
        }
    }

    async fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let blob =
            serde_json::to_value(value).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.kv.set(key, blob).await
    }

    /// Full solve history, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails or the blob does not decode.
    pub async fn results(&self) -> Result<Vec<ProblemResult>, StorageError> {
        self.read_or_default(keys::RESULTS).await
    }

    /// Appends one solved problem to the history.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails or the blob does not decode.
    pub async fn append_result(&self, result: &ProblemResult) -> Result<(), StorageError> {
        let mut results = self.results().await?;
        results.push(result.clone());
        self.write(keys::RESULTS, &results).await
    }

    /// Replaces the solve history wholesale.
    ///
    /// The destructive clear action goes through here with an empty slice;
    /// records, badges and daily bests are untouched.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    pub async fn replace_results(&self, results: &[ProblemResult]) -> Result<(), StorageError> {
        self.write(keys::RESULTS, &results).await
    }

    /// Session record board, best score first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails or the blob does not decode.
    pub async fn records(&self) -> Result<Vec<SessionRecord>, StorageError> {
        self.read_or_default(keys::RECORDS).await
    }

    /// Merges a completed session into the record board, enforcing the
    /// ten-entry cap before writing back.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails or the blob does not decode.
    pub async fn append_record(&self, record: SessionRecord) -> Result<(), StorageError> {
        let mut records = self.records().await?;
        merge_record(&mut records, record);
        self.write(keys::RECORDS, &records).await
    }

    /// Earned badge flags.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails or the blob does not decode.
    pub async fn badges(&self) -> Result<BadgeSet, StorageError> {
        self.read_or_default(keys::BADGES).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    pub async fn save_badges(&self, badges: &BadgeSet) -> Result<(), StorageError> {
        self.write(keys::BADGES, badges).await
    }

    /// Best inferred session score per day.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails or the blob does not decode.
    pub async fn daily_bests(&self) -> Result<DailyBestMap, StorageError> {
        self.read_or_default(keys::DAILY_BESTS).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    pub async fn save_daily_bests(&self, bests: &DailyBestMap) -> Result<(), StorageError> {
        self.write(keys::DAILY_BESTS, bests).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mathpace_core::model::Badge;
    use mathpace_core::time::fixed_now;

    #[tokio::test]
    async fn absent_keys_read_as_defaults() {
        let store = TrackerStore::in_memory();

        assert!(store.results().await.unwrap().is_empty());
        assert!(store.records().await.unwrap().is_empty());
        assert_eq!(store.badges().await.unwrap().earned_count(), 0);
        assert!(store.daily_bests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn append_result_grows_the_history_in_order() {
        let store = TrackerStore::in_memory();
        let first = ProblemResult::new("2 + 3", 900.0, fixed_now()).unwrap();
        let second = ProblemResult::new("7 × 8", 2_100.0, fixed_now()).unwrap();

        store.append_result(&first).await.unwrap();
        store.append_result(&second).await.unwrap();

        let results = store.results().await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].problem, "2 + 3");
        assert_eq!(results[1].problem, "7 × 8");
    }

    #[tokio::test]
    async fn record_board_is_capped_through_the_facade() {
        let store = TrackerStore::in_memory();
        for score in 1..=12 {
            store
                .append_record(SessionRecord::new(score, fixed_now()))
                .await
                .unwrap();
        }

        let records = store.records().await.unwrap();
        assert_eq!(records.len(), 10);
        assert_eq!(records[0].score, 12);
        assert_eq!(records[9].score, 3);
    }

    #[tokio::test]
    async fn clearing_results_preserves_the_other_keys() {
        let store = TrackerStore::in_memory();
        store
            .append_result(&ProblemResult::new("2 + 3", 900.0, fixed_now()).unwrap())
            .await
            .unwrap();
        store
            .append_record(SessionRecord::new(41, fixed_now()))
            .await
            .unwrap();
        let mut badges = store.badges().await.unwrap();
        badges.award(Badge::First10);
        store.save_badges(&badges).await.unwrap();

        store.replace_results(&[]).await.unwrap();

        assert!(store.results().await.unwrap().is_empty());
        assert_eq!(store.records().await.unwrap().len(), 1);
        assert!(store.badges().await.unwrap().is_earned(Badge::First10));
    }

    #[tokio::test]
    async fn write_counter_tracks_sets() {
        let kv = Arc::new(InMemoryStore::new());
        let store = TrackerStore::new(kv.clone());

        assert_eq!(kv.write_count(), 0);
        store.save_badges(&BadgeSet::new()).await.unwrap();
        store.save_badges(&BadgeSet::new()).await.unwrap();
        assert_eq!(kv.write_count(), 2);
    }
}
