//! SQLite-backed store for districts, inventory, requests, and credentials
//!
//! A single `Store` owns the connection; callers share it behind
//! `Arc<tokio::sync::Mutex<Store>>` so every read-modify-write on a district
//! or request is serialized. All mutations run inside a transaction: readers
//! observe either the pre- or fully-post-mutation state, never a partial one.

pub mod districts;
pub mod inventory;
pub mod requests;
pub mod users;

use std::path::Path;
use std::sync::Arc;

use rusqlite::Connection;
use tokio::sync::Mutex;
use tracing::info;

use crate::error::Result;

pub use districts::{District, DistrictView};
pub use requests::{NewRequest, Request, RequestKind, RequestStatus};
pub use users::User;

/// Store shared between request handlers and the escalator task
pub type SharedStore = Arc<Mutex<Store>>;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS districts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    latitude REAL NOT NULL,
    longitude REAL NOT NULL
);

CREATE TABLE IF NOT EXISTS inventory (
    district_id INTEGER NOT NULL REFERENCES districts(id),
    item_key TEXT NOT NULL,
    quantity INTEGER NOT NULL CHECK (quantity > 0),
    UNIQUE (district_id, item_key)
);

CREATE TABLE IF NOT EXISTS requests (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    type TEXT NOT NULL,
    subtype TEXT NOT NULL,
    priority INTEGER NOT NULL,
    latitude REAL NOT NULL,
    longitude REAL NOT NULL,
    quantity INTEGER NOT NULL,
    tckn TEXT,
    notes TEXT,
    timestamp INTEGER NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending',
    related_district INTEGER REFERENCES districts(id)
);

CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    role TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS revoked_tokens (
    jti TEXT PRIMARY KEY,
    expires_at INTEGER NOT NULL
);
";

/// SQLite store, WAL mode for concurrent read access.
pub struct Store {
    db: Connection,
}

impl Store {
    /// Open or create the store under the given data directory.
    pub fn open(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;
        let db_path = data_dir.join("relief.db");
        let db = Connection::open(&db_path)?;

        db.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        db.execute_batch(SCHEMA)?;

        info!(path = %db_path.display(), "Store initialized");

        Ok(Self { db })
    }

    /// In-memory store for tests.
    pub fn open_in_memory() -> Result<Self> {
        let db = Connection::open_in_memory()?;
        db.execute_batch("PRAGMA foreign_keys=ON;")?;
        db.execute_batch(SCHEMA)?;
        Ok(Self { db })
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.db
    }

    /// Begin a transaction. Commits on `commit()`, rolls back on drop.
    pub(crate) fn begin(&mut self) -> Result<rusqlite::Transaction<'_>> {
        Ok(self.db.transaction()?)
    }

    /// Wrap a store in the shared handle used by handlers and the escalator.
    pub fn into_shared(self) -> SharedStore {
        Arc::new(Mutex::new(self))
    }
}
