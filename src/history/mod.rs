//! Per-wine environment history: bounded, append-only, persisted.

pub mod backend;
mod migrations;
pub mod models;
pub mod sqlite;
pub mod store;

pub use backend::{HistoryBackend, JsonFileBackend};
pub use models::{EnvironmentRecord, SensorSnapshot};
pub use sqlite::SqliteBackend;
pub use store::{EnvironmentHistoryStore, DEFAULT_CAPACITY};
