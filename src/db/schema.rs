//! Database schema and migrations

use rusqlite::Connection;

use crate::Result;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 2;

/// Initialize the database schema
///
/// # Errors
///
/// Returns error if migration fails
pub fn init(conn: &Connection) -> Result<()> {
    let version: i32 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .unwrap_or(0);

    if version < 1 {
        migrate_v1(conn)?;
    }
    if version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

fn migrate_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r"
        -- Users table
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            username TEXT UNIQUE NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Recipes table
        CREATE TABLE IF NOT EXISTS recipes (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id),
            name TEXT NOT NULL,
            meal_type TEXT NOT NULL DEFAULT '',
            max_minutes INTEGER NOT NULL DEFAULT 0,
            skill_level TEXT NOT NULL DEFAULT '',
            dietary_tags TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_recipes_user ON recipes(user_id);
        CREATE INDEX IF NOT EXISTS idx_recipes_name ON recipes(name);

        -- Ordered ingredient rows
        CREATE TABLE IF NOT EXISTS ingredients (
            recipe_id TEXT NOT NULL REFERENCES recipes(id),
            position INTEGER NOT NULL,
            name TEXT NOT NULL,
            quantity TEXT NOT NULL DEFAULT '',
            unit TEXT NOT NULL DEFAULT '',
            PRIMARY KEY (recipe_id, position)
        );

        -- Ordered step rows
        CREATE TABLE IF NOT EXISTS steps (
            recipe_id TEXT NOT NULL REFERENCES recipes(id),
            position INTEGER NOT NULL,
            body TEXT NOT NULL,
            PRIMARY KEY (recipe_id, position)
        );

        PRAGMA user_version = 1;
        ",
    )?;

    tracing::info!("migrated to schema v1");
    Ok(())
}

fn migrate_v2(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r"
        -- Per-(user, recipe) usage statistics, written at session end only
        CREATE TABLE IF NOT EXISTS recipe_stats (
            user_id TEXT NOT NULL REFERENCES users(id),
            recipe_id TEXT NOT NULL REFERENCES recipes(id),
            sessions INTEGER NOT NULL DEFAULT 0,
            times_cooked INTEGER NOT NULL DEFAULT 0,
            rating INTEGER,
            last_session_at TEXT,
            PRIMARY KEY (user_id, recipe_id)
        );

        PRAGMA user_version = 2;
        ",
    )?;

    tracing::info!("migrated to schema v2");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init(&conn).unwrap();
        init(&conn).unwrap();

        let version: i32 = conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }
}
