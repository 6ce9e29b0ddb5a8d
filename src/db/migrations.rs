//! Versioned schema for the document store

use rusqlite::Connection;

use super::connection::DbResult;

/// Latest store layout. Unrelated to the `schemaVersion` inside documents.
const STORE_VERSION: i32 = 1;

/// Bring the store up to [`STORE_VERSION`]. Safe to call on every start.
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    if get_schema_version(conn)? < 1 {
        let tx = conn.unchecked_transaction()?;
        migrate_v1(&tx)?;
        tx.execute("INSERT INTO schema_migrations (version) VALUES (?1)", [1])?;
        tx.commit()?;
        tracing::info!("Store migrated to v1");
    }

    Ok(())
}

/// v1: diary and profile documents
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- One JSON document per day, keyed yyyy-MM-dd
        CREATE TABLE food_diaries (
            date TEXT PRIMARY KEY,
            document TEXT NOT NULL CHECK(json_valid(document)),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Single row (id = 1)
        CREATE TABLE user_profile (
            id INTEGER PRIMARY KEY CHECK(id = 1),
            document TEXT NOT NULL CHECK(json_valid(document)),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        "#,
    )?;

    Ok(())
}

/// Highest applied store version, 0 for a fresh file
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);
    Ok(version)
}

pub fn needs_migration(conn: &Connection) -> DbResult<bool> {
    let current = get_schema_version(conn)?;
    Ok(current < STORE_VERSION)
}
