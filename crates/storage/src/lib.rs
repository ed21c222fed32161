#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{InMemoryStore, KvStore, StorageError, TrackerStore, keys};
pub use sqlite::{SqliteInitError, SqliteStore};
