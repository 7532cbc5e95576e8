//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::Connection;

use super::connection::DbResult;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
    }

    Ok(())
}

/// Migration v1: users and scan history
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- USERS
        -- Signed-in profile with preferences and cached stats
        -- ============================================
        CREATE TABLE users (
            id TEXT PRIMARY KEY,                 -- "user_<millis>"
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            join_date TEXT NOT NULL,             -- RFC 3339

            -- Preferences
            language TEXT NOT NULL DEFAULT 'en',
            notifications INTEGER NOT NULL DEFAULT 1,
            public_profile INTEGER NOT NULL DEFAULT 0,
            dietary_restrictions TEXT NOT NULL DEFAULT '[]',  -- JSON array

            -- Cached stats - recalculated when a scan is stored
            total_scans INTEGER NOT NULL DEFAULT 0,
            avg_score INTEGER NOT NULL DEFAULT 0,
            streak INTEGER NOT NULL DEFAULT 0,

            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- ============================================
        -- SCANS
        -- Per-user scan history, newest kept, oldest evicted
        -- No foreign key: signing out keeps the history
        -- ============================================
        CREATE TABLE scans (
            id TEXT PRIMARY KEY,                 -- "scan_<millis>_<suffix>"
            user_id TEXT NOT NULL,
            source TEXT NOT NULL CHECK(source IN ('text', 'upload', 'camera', 'voice', 'barcode')),
            language TEXT NOT NULL DEFAULT 'en',
            product_name TEXT,
            extracted_text TEXT NOT NULL,

            results_json TEXT NOT NULL,          -- JSON array of analysis results
            score_json TEXT,                     -- JSON nutrition score, null when nothing was found
            overall_score INTEGER,               -- copy of score.overall for aggregation
            harmful_count INTEGER NOT NULL DEFAULT 0,
            risk_score INTEGER NOT NULL DEFAULT 0,
            risk_level TEXT NOT NULL,
            alerts_json TEXT NOT NULL DEFAULT '[]',

            created_at TEXT NOT NULL             -- RFC 3339 with milliseconds
        );

        CREATE INDEX idx_scans_user ON scans(user_id);
        CREATE INDEX idx_scans_user_created ON scans(user_id, created_at);
        "#,
    )?;

    Ok(())
}

/// Get the current schema version
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

/// Check if the database needs migration
pub fn needs_migration(conn: &Connection) -> DbResult<bool> {
    let current = get_schema_version(conn)?;
    Ok(current < SCHEMA_VERSION)
}
