#![forbid(unsafe_code)]

mod audit;
mod categories;
mod error;
mod items;
mod locations;
mod queries;
mod requests;
mod schema;
mod sections;

pub use error::StoreError;
pub use requests::*;

use inv_core::model::{MAX_LOCATOR_LEN, MAX_NAME_LEN};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DB_FILE: &str = "inventory.db";

#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    storage_dir: PathBuf,
}

impl SqliteStore {
    pub fn open(storage_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let storage_dir = storage_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&storage_dir)?;

        let db_path = storage_dir.join(DB_FILE);
        let conn = Connection::open(&db_path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        schema::install(&conn)?;
        tracing::debug!(path = %db_path.display(), "inventory store opened");

        Ok(Self { conn, storage_dir })
    }

    pub fn db_path(&self) -> PathBuf {
        self.storage_dir.join(DB_FILE)
    }
}

fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(duration) => duration,
        Err(_) => return 0,
    };

    i64::try_from(now.as_millis()).unwrap_or(i64::MAX)
}

fn normalize_name(value: &str) -> Result<String, StoreError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(StoreError::InvalidInput("name must not be empty"));
    }
    if value.chars().count() > MAX_NAME_LEN {
        return Err(StoreError::InvalidInput("name is too long"));
    }
    Ok(value.to_string())
}

fn normalize_locator(value: &str) -> Result<String, StoreError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(StoreError::InvalidInput("locator must not be empty"));
    }
    if value.chars().count() > MAX_LOCATOR_LEN {
        return Err(StoreError::InvalidInput("locator is too long"));
    }
    Ok(value.to_string())
}

/// `?,?,?` for an `IN (...)` clause with `count` parameters.
fn placeholders(count: usize) -> String {
    vec!["?"; count].join(",")
}

/// Every whitespace-separated term of `search` occurs in at least one of `fields`,
/// case-insensitively. A blank search matches everything.
fn matches_search(search: Option<&str>, fields: &[&str]) -> bool {
    let Some(search) = search else {
        return true;
    };
    let fields = fields
        .iter()
        .map(|field| field.to_lowercase())
        .collect::<Vec<_>>();
    search.split_whitespace().all(|term| {
        let term = term.to_lowercase();
        fields.iter().any(|field| field.contains(&term))
    })
}
