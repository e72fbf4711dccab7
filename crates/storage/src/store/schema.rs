#![forbid(unsafe_code)]

use super::StoreError;
use rusqlite::{Connection, params};

pub(super) const SCHEMA_VERSION: &str = "1";

const SQL: &str = r#"
        CREATE TABLE IF NOT EXISTS meta (
          key TEXT PRIMARY KEY,
          value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS locations (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          name TEXT NOT NULL,
          locator TEXT NOT NULL,
          description TEXT NOT NULL DEFAULT '',
          parent_id INTEGER REFERENCES locations(id) ON DELETE SET NULL
        );

        CREATE TABLE IF NOT EXISTS categories (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          name TEXT NOT NULL,
          parent_id INTEGER REFERENCES categories(id) ON DELETE SET NULL
        );

        CREATE TABLE IF NOT EXISTS items (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          name TEXT NOT NULL,
          description TEXT NOT NULL DEFAULT '',
          amount INTEGER NOT NULL DEFAULT 1,
          unit TEXT NOT NULL DEFAULT 'pieces',
          location_id INTEGER REFERENCES locations(id) ON DELETE SET NULL,
          category_id INTEGER REFERENCES categories(id) ON DELETE SET NULL,
          expiration TEXT
        );

        CREATE TABLE IF NOT EXISTS audit_log (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          ts_ms INTEGER NOT NULL,
          actor TEXT NOT NULL,
          model TEXT NOT NULL,
          object_id INTEGER NOT NULL,
          object_repr TEXT NOT NULL,
          action TEXT NOT NULL,
          message TEXT NOT NULL DEFAULT ''
        );

        CREATE INDEX IF NOT EXISTS idx_locations_parent ON locations(parent_id);
        CREATE INDEX IF NOT EXISTS idx_categories_parent ON categories(parent_id);
        CREATE INDEX IF NOT EXISTS idx_items_location ON items(location_id);
        CREATE INDEX IF NOT EXISTS idx_items_category ON items(category_id);
        CREATE INDEX IF NOT EXISTS idx_audit_object ON audit_log(model, object_id);
"#;

pub(super) fn install(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO meta(key, value) VALUES (?1, ?2)",
        params!["schema_version", SCHEMA_VERSION],
    )?;
    Ok(())
}
