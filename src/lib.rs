//! # Rfstore - RF Emitter Observation Store
//!
//! Persistent storage for radio-frequency emitter records: Wi-Fi access
//! points, cell towers, and Bluetooth beacons, each keyed by (type, id)
//! and carrying an estimated position, an uncertainty radius, a trust
//! score, and a free-text note.
//!
//! Rfstore provides:
//! - Point lookup by emitter identity
//! - Spatial range queries by lat/lon bounding box
//! - Batched create/update/delete committed atomically
//! - SQLite-backed persistence with forward-only schema migrations
//!
//! The store is deliberately dumb about the data it holds: trust scores
//! are opaque integers managed by the caller, coordinates are not
//! validated, and position fusion happens upstream.

pub mod bbox;
pub mod config;
pub mod emitter;
pub mod storage;

// Re-exports for convenient access
pub use bbox::BoundingBox;
pub use emitter::{EmitterIdentity, EmitterRecord, EmitterType};
pub use storage::EmitterStore;

/// Result type alias for Rfstore operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Rfstore operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The backing database file could not be opened or created
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// `begin_transaction` was called while a transaction is already open
    #[error("A transaction is already open")]
    AlreadyInTransaction,

    /// A mutation was attempted with no open transaction
    #[error("No open transaction")]
    NoTransaction,

    /// Insert collided with an existing (id, type) primary key
    #[error("Emitter already present: {0}")]
    Conflict(String),

    /// Read/write failure during a query or commit
    #[error("Storage I/O error: {0}")]
    Io(#[from] rusqlite::Error),

    /// A stored emitter type string could not be parsed
    #[error("Unknown emitter type: {0}")]
    UnknownType(String),
}
