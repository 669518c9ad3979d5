//! Database schema definitions and forward-only migrations

use crate::Result;
use rusqlite::Connection;

/// Current schema version, stored in SQLite's `user_version` pragma
pub const SCHEMA_VERSION: i32 = 1;

/// SQL to create the emitters table (version 1 layout)
pub const CREATE_EMITTERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS emitters (
    identifier TEXT NOT NULL,
    type TEXT NOT NULL,
    trust INTEGER NOT NULL,
    latitude REAL NOT NULL,
    longitude REAL NOT NULL,
    radius REAL NOT NULL,
    note TEXT,
    PRIMARY KEY (identifier, type)
)
"#;

/// Migration steps, indexed by the version they upgrade *from*.
///
/// Each step must be idempotent; a database at version N replays steps
/// N..SCHEMA_VERSION in order. Only the initial layout exists so far.
const MIGRATIONS: &[&[&str]] = &[
    // 0 -> 1: initial layout
    &[CREATE_EMITTERS_TABLE],
];

/// Bring a connection up to `SCHEMA_VERSION`, applying any pending steps
pub fn migrate(conn: &Connection) -> Result<()> {
    let version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    for from in version..SCHEMA_VERSION {
        tracing::debug!("migrating schema {} -> {}", from, from + 1);
        for stmt in MIGRATIONS[from as usize] {
            conn.execute(stmt, [])?;
        }
    }

    if version < SCHEMA_VERSION {
        // PRAGMA does not support parameter binding; version is a const
        conn.execute(&format!("PRAGMA user_version = {}", SCHEMA_VERSION), [])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrate_fresh_database() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();

        let version: i32 = conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);

        // table is queryable
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM emitters", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_migrate_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        migrate(&conn).unwrap();

        let version: i32 = conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }
}
