//! SQLite-backed emitter store

use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension};

use super::schema;
use crate::bbox::BoundingBox;
use crate::emitter::{EmitterIdentity, EmitterRecord, EmitterType};
use crate::{Error, Result};

/// SQLite-backed storage for RF emitter records.
///
/// Not thread safe: the store assumes a single logical writer drives the
/// begin/mutate/end sequence. All transaction and mutation methods take
/// `&mut self`, so one handle cannot interleave write sequences; callers
/// sharing a store across threads must serialize access externally.
pub struct EmitterStore {
    conn: Connection,
    within_transaction: bool,
    updates_made: bool,
}

impl EmitterStore {
    /// Open a database file, creating it and its schema if absent.
    ///
    /// Runs any pending forward-only migrations before returning.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .map_err(|e| Error::Unavailable(format!("{}: {}", path.display(), e)))?;
        schema::migrate(&conn)
            .map_err(|e| Error::Unavailable(format!("{}: {}", path.display(), e)))?;
        Ok(Self {
            conn,
            within_transaction: false,
            updates_made: false,
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::Unavailable(e.to_string()))?;
        schema::migrate(&conn)?;
        Ok(Self {
            conn,
            within_transaction: false,
            updates_made: false,
        })
    }

    /// Release the backing connection explicitly.
    ///
    /// Dropping the store has the same effect; this surfaces close errors.
    pub fn close(self) -> Result<()> {
        let EmitterStore { conn, .. } = self;
        conn.close().map_err(|(_, e)| e.into())
    }

    // ========== Transaction Protocol ==========

    /// Start an atomic unit of work.
    ///
    /// Returns `Error::AlreadyInTransaction` if one is already open; the
    /// first transaction stays active and no state changes. This is a
    /// caller bug, logged and non-fatal.
    pub fn begin_transaction(&mut self) -> Result<()> {
        if self.within_transaction {
            tracing::warn!("begin_transaction() called while already in a transaction");
            return Err(Error::AlreadyInTransaction);
        }
        self.conn.execute_batch("BEGIN")?;
        self.within_transaction = true;
        self.updates_made = false;
        Ok(())
    }

    /// End the current unit of work.
    ///
    /// Commits only if at least one mutation happened since
    /// `begin_transaction`; a mutation-free transaction is rolled back so
    /// nothing degenerate is persisted. Called with no open transaction,
    /// this logs a warning and is a no-op. The store is back in the
    /// "no transaction" state afterwards even if the commit failed.
    pub fn end_transaction(&mut self) -> Result<()> {
        if !self.within_transaction {
            tracing::warn!("end_transaction() called with no open transaction");
            return Ok(());
        }
        let commit = self.updates_made;
        self.within_transaction = false;
        self.updates_made = false;

        if commit {
            if let Err(e) = self.conn.execute_batch("COMMIT") {
                // Best effort: leave the connection out of the failed
                // transaction so the caller can retry on a fresh one.
                let _ = self.conn.execute_batch("ROLLBACK");
                return Err(e.into());
            }
        } else {
            tracing::debug!("no mutations in transaction, rolling back");
            self.conn.execute_batch("ROLLBACK")?;
        }
        Ok(())
    }

    fn require_transaction(&self) -> Result<()> {
        if !self.within_transaction {
            tracing::warn!("mutation attempted outside a transaction");
            return Err(Error::NoTransaction);
        }
        Ok(())
    }

    // ========== Mutations ==========

    /// Insert a new emitter row.
    ///
    /// The identity must not already be present; a duplicate (id, type)
    /// key fails with `Error::Conflict` and leaves the original row
    /// intact. Callers replacing a record should `drop_emitter` first.
    pub fn insert(&mut self, identity: &EmitterIdentity, record: &EmitterRecord) -> Result<()> {
        self.require_transaction()?;
        let result = self.conn.execute(
            r#"
            INSERT INTO emitters (identifier, type, trust, latitude, longitude, radius, note)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                identity.id,
                identity.emitter_type.as_str(),
                record.trust,
                record.latitude,
                record.longitude,
                record.radius,
                record.note,
            ],
        );
        match result {
            Ok(_) => {
                self.updates_made = true;
                Ok(())
            }
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(Error::Conflict(identity.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Overwrite the mutable fields of an existing emitter row.
    ///
    /// Identity is immutable; only trust, position, radius and note
    /// change. A missing identity affects zero rows and is not an error.
    pub fn update(&mut self, identity: &EmitterIdentity, record: &EmitterRecord) -> Result<()> {
        self.require_transaction()?;
        self.conn.execute(
            r#"
            UPDATE emitters
            SET trust = ?1, latitude = ?2, longitude = ?3, radius = ?4, note = ?5
            WHERE identifier = ?6 AND type = ?7
            "#,
            params![
                record.trust,
                record.latitude,
                record.longitude,
                record.radius,
                record.note,
                identity.id,
                identity.emitter_type.as_str(),
            ],
        )?;
        self.updates_made = true;
        Ok(())
    }

    /// Drop an emitter row. No-op if the identity is absent.
    ///
    /// Marks the transaction dirty only when a row was actually removed,
    /// so a transaction of nothing but missed drops still commits empty.
    pub fn drop_emitter(&mut self, identity: &EmitterIdentity) -> Result<()> {
        self.require_transaction()?;
        let removed = self.conn.execute(
            "DELETE FROM emitters WHERE identifier = ?1 AND type = ?2",
            params![identity.id, identity.emitter_type.as_str()],
        )?;
        if removed > 0 {
            self.updates_made = true;
        }
        Ok(())
    }

    // ========== Queries ==========

    /// Identities of all emitters of one type inside a bounding box.
    ///
    /// Bounds are inclusive on all four edges. Reads the latest committed
    /// state plus any in-flight transaction on this handle. An empty set
    /// is a normal result.
    pub fn get_emitters(
        &self,
        emitter_type: EmitterType,
        bb: &BoundingBox,
    ) -> Result<HashSet<EmitterIdentity>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT identifier FROM emitters
            WHERE type = ?1
              AND latitude >= ?2 AND latitude <= ?3
              AND longitude >= ?4 AND longitude <= ?5
            "#,
        )?;

        let rows = stmt.query_map(
            params![emitter_type.as_str(), bb.south, bb.north, bb.west, bb.east],
            |row| {
                let id: String = row.get(0)?;
                Ok(EmitterIdentity::new(emitter_type, id))
            },
        )?;

        let mut result = HashSet::new();
        for identity in rows {
            result.insert(identity?);
        }
        Ok(result)
    }

    /// Full record for one identity, or `None` if we know nothing about it.
    ///
    /// A NULL note column is normalized to the empty string.
    pub fn get_emitter(&self, identity: &EmitterIdentity) -> Result<Option<EmitterRecord>> {
        self.conn
            .query_row(
                r#"
                SELECT trust, latitude, longitude, radius, note FROM emitters
                WHERE identifier = ?1 AND type = ?2
                "#,
                params![identity.id, identity.emitter_type.as_str()],
                |row| self.row_to_record(row),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Dump every stored emitter, ordered by type then identifier
    pub fn export_all(&self) -> Result<Vec<(EmitterIdentity, EmitterRecord)>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT identifier, type, trust, latitude, longitude, radius, note
            FROM emitters ORDER BY type, identifier
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            let id: String = row.get(0)?;
            let type_str: String = row.get(1)?;
            let note: Option<String> = row.get(6)?;
            Ok((
                id,
                type_str,
                EmitterRecord {
                    trust: row.get(2)?,
                    latitude: row.get(3)?,
                    longitude: row.get(4)?,
                    radius: row.get(5)?,
                    note: note.unwrap_or_default(),
                },
            ))
        })?;

        let mut result = Vec::new();
        for row in rows {
            let (id, type_str, record) = row?;
            let emitter_type = EmitterType::from_str(&type_str)?;
            result.push((EmitterIdentity::new(emitter_type, id), record));
        }
        Ok(result)
    }

    /// Get per-type row counts
    pub fn stats(&self) -> Result<StoreStats> {
        let mut stats = StoreStats::default();
        let mut stmt = self
            .conn
            .prepare("SELECT type, COUNT(*) FROM emitters GROUP BY type")?;
        let rows = stmt.query_map([], |row| {
            let type_str: String = row.get(0)?;
            let count: i64 = row.get(1)?;
            Ok((type_str, count))
        })?;

        for row in rows {
            let (type_str, count) = row?;
            let count = count as usize;
            stats.total += count;
            match EmitterType::from_str(&type_str)? {
                EmitterType::Wifi => stats.wifi = count,
                EmitterType::Bluetooth => stats.bluetooth = count,
                EmitterType::Cell => stats.cell = count,
            }
        }
        Ok(stats)
    }

    /// Helper to convert a row to an EmitterRecord
    fn row_to_record(&self, row: &rusqlite::Row) -> rusqlite::Result<EmitterRecord> {
        let note: Option<String> = row.get(4)?;
        Ok(EmitterRecord {
            trust: row.get(0)?,
            latitude: row.get(1)?,
            longitude: row.get(2)?,
            radius: row.get(3)?,
            note: note.unwrap_or_default(),
        })
    }

    #[cfg(test)]
    fn transaction_dirty(&self) -> bool {
        self.updates_made
    }
}

/// Row counts by emitter type
#[derive(Debug, Clone, Default)]
pub struct StoreStats {
    pub wifi: usize,
    pub bluetooth: usize,
    pub cell: usize,
    pub total: usize,
}

impl std::fmt::Display for StoreStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Emitter Statistics:")?;
        writeln!(f, "  Wi-Fi: {}", self.wifi)?;
        writeln!(f, "  Bluetooth: {}", self.bluetooth)?;
        writeln!(f, "  Cell: {}", self.cell)?;
        writeln!(f, "  Total: {}", self.total)
    }
}
