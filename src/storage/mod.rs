//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with a single table:
//! - emitters(identifier, type, trust, latitude, longitude, radius, note)
//!
//! Primary key is (identifier, type). The schema version lives in the
//! `user_version` pragma; upgrades are forward-only migration steps.

pub mod schema;
pub mod sqlite;

pub use sqlite::{EmitterStore, StoreStats};
