// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{Connection, OpenFlags};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use tracing::warn;

use crate::error::StoreError;

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.alphavelocity", "Ledgerd", "ledgerd"));

pub fn default_db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("ledgerd.sqlite"))
}

/// Shared database handle: one read-write primary connection plus zero or
/// more read-only readers over the same file. Writes serialize on the
/// primary; reads round-robin across readers. All statement execution
/// happens on the blocking pool behind a semaphore sized to the total
/// connection count.
#[derive(Clone)]
pub struct Db {
    primary: Arc<Mutex<Connection>>,
    readers: Arc<Vec<Mutex<Connection>>>,
    cursor: Arc<AtomicUsize>,
    sem: Arc<Semaphore>,
}

impl Db {
    pub fn open(path: &Path, read_connections: usize) -> Result<Db> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }
        let mut conn = Connection::open(path)
            .with_context(|| format!("Open DB at {}", path.display()))?;
        configure(&conn)?;
        init_schema(&mut conn)?;

        // Separate handles on an in-memory database would not share state.
        let in_memory = path.as_os_str() == ":memory:";
        let mut readers = Vec::new();
        if !in_memory {
            for _ in 0..read_connections {
                let reader = Connection::open_with_flags(
                    path,
                    OpenFlags::SQLITE_OPEN_READ_ONLY
                        | OpenFlags::SQLITE_OPEN_NO_MUTEX
                        | OpenFlags::SQLITE_OPEN_URI,
                )
                .with_context(|| format!("Open read-only DB at {}", path.display()))?;
                reader
                    .execute_batch("PRAGMA busy_timeout=5000;")
                    .context("Configure read-only connection")?;
                readers.push(Mutex::new(reader));
            }
        }

        let total = readers.len() + 1;
        Ok(Db {
            primary: Arc::new(Mutex::new(conn)),
            readers: Arc::new(readers),
            cursor: Arc::new(AtomicUsize::new(0)),
            sem: Arc::new(Semaphore::new(total)),
        })
    }

    pub fn open_in_memory() -> Result<Db> {
        let mut conn = Connection::open_in_memory().context("Open in-memory DB")?;
        configure(&conn)?;
        init_schema(&mut conn)?;
        Ok(Db {
            primary: Arc::new(Mutex::new(conn)),
            readers: Arc::new(Vec::new()),
            cursor: Arc::new(AtomicUsize::new(0)),
            sem: Arc::new(Semaphore::new(1)),
        })
    }

    /// Run `f` against the primary connection on the blocking pool.
    pub async fn write<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.clone();
        let _permit = self.sem.acquire().await.expect("semaphore closed");
        tokio::task::spawn_blocking(move || {
            let conn = db.primary.lock().unwrap_or_else(|p| p.into_inner());
            f(&conn)
        })
        .await
        .map_err(|e| StoreError::Join(e.to_string()))?
    }

    /// Run `f` against the next reader, falling back to the primary when no
    /// readers are configured.
    pub async fn read<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.clone();
        let turn = self.cursor.fetch_add(1, Ordering::Relaxed);
        let _permit = self.sem.acquire().await.expect("semaphore closed");
        tokio::task::spawn_blocking(move || {
            if db.readers.is_empty() {
                let conn = db.primary.lock().unwrap_or_else(|p| p.into_inner());
                f(&conn)
            } else {
                let conn = db.readers[turn % db.readers.len()]
                    .lock()
                    .unwrap_or_else(|p| p.into_inner());
                f(&conn)
            }
        })
        .await
        .map_err(|e| StoreError::Join(e.to_string()))?
    }

    /// Close the primary handle, then each reader in order. Handles still
    /// held elsewhere (abandoned in-flight work) are logged and left to
    /// drop.
    pub fn close(self) {
        let Db { primary, readers, .. } = self;
        match Arc::try_unwrap(primary) {
            Ok(m) => {
                let conn = m.into_inner().unwrap_or_else(|p| p.into_inner());
                if let Err((_, e)) = conn.close() {
                    warn!(error = %e, "failed to close primary connection");
                }
            }
            Err(_) => warn!("primary connection still in use at shutdown"),
        }
        match Arc::try_unwrap(readers) {
            Ok(list) => {
                for (i, m) in list.into_iter().enumerate() {
                    let conn = m.into_inner().unwrap_or_else(|p| p.into_inner());
                    if let Err((_, e)) = conn.close() {
                        warn!(reader = i, error = %e, "failed to close reader connection");
                    }
                }
            }
            Err(_) => warn!("reader connections still in use at shutdown"),
        }
    }
}

fn configure(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "PRAGMA journal_mode=WAL;
         PRAGMA synchronous=NORMAL;
         PRAGMA foreign_keys=ON;
         PRAGMA busy_timeout=5000;",
    )
    .context("Configure connection")?;
    Ok(())
}

fn init_schema(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS categories(
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT,
        parent_id TEXT REFERENCES categories(id),
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS items(
        id TEXT PRIMARY KEY,
        kind TEXT NOT NULL CHECK(kind IN ('income','expense','refund','transfer')),
        title TEXT NOT NULL,
        amount TEXT NOT NULL,
        currency TEXT NOT NULL,
        occurred_at TEXT NOT NULL,
        category_id TEXT REFERENCES categories(id),
        metadata TEXT NOT NULL DEFAULT '{}',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_items_occurred_at ON items(occurred_at);
    CREATE INDEX IF NOT EXISTS idx_items_category_id ON items(category_id);
    CREATE INDEX IF NOT EXISTS idx_items_kind ON items(kind);
    "#,
    )?;
    Ok(())
}
