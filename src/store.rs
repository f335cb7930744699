//! Persistent thumbnail store.
//!
//! A versioned key/value store holding one collection, `images`, that maps a
//! [`ThumbnailKey`] to the thumbnail's data-URI string. It is backed by a
//! single SQLite file at `<dir>/<name>.sqlite3` and survives restarts.
//!
//! # Lifecycle
//!
//! ```text
//! Unopened → Opening → Ready
//!                ↘ Upgrading ↗
//! Ready → Closed (reset) → Opening → …
//! ```
//!
//! Callers never touch the connection. [`ThumbnailStore`] exposes `open`,
//! `put`, `get`, `enumerate_all`, `reset` and `close`, and every read/write
//! checks the lifecycle first:
//!
//! - While the store is opening, upgrading or resetting, reads and writes
//!   wait on the lifecycle lock and run once it is `Ready`.
//! - On an `Unopened` or `Closed` store they fail with
//!   [`StoreError::NotReady`].
//!
//! # Versioning
//!
//! The schema version lives in SQLite's `PRAGMA user_version`. When the file
//! is new (version 0) or older than the requested version, the collection is
//! created inside one transaction that also bumps the version, and only then
//! does the store become `Ready`. A file newer than the requested version is
//! refused.
//!
//! # Concurrency
//!
//! SQLite calls are blocking and run on tokio's blocking pool. Concurrent
//! writes to different keys are serialized by the connection; no further
//! locking is needed by callers. A `reset` waits for reads and writes that
//! already hold the lifecycle lock; ones queued after it land in the fresh
//! store.

use crate::key::ThumbnailKey;
use rusqlite::{Connection, OptionalExtension, params};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tokio::sync::RwLock;

/// Sidecar files SQLite keeps next to the database in WAL mode.
const SIDECAR_SUFFIXES: &[&str] = &["-wal", "-shm"];

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("store is {0}, not ready")]
    NotReady(StoreState),
    #[error("store version {existing} is newer than requested version {requested}")]
    VersionDowngrade { existing: u32, requested: u32 },
    #[error("store worker failed: {0}")]
    Worker(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    Unopened,
    Opening,
    Upgrading,
    Ready,
    Closed,
}

impl fmt::Display for StoreState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StoreState::Unopened => "unopened",
            StoreState::Opening => "opening",
            StoreState::Upgrading => "upgrading",
            StoreState::Ready => "ready",
            StoreState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// What `open` had to do to reach `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    /// Existing store at the requested version.
    Opened,
    /// New store (`from == 0`) or older schema brought up to `to`.
    Upgraded { from: u32, to: u32 },
    /// The store was already `Ready`; nothing happened.
    AlreadyOpen,
}

/// One persisted thumbnail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreRecord {
    pub key: ThumbnailKey,
    /// Data-URI of the encoded thumbnail.
    pub value: String,
}

type SharedConnection = Arc<Mutex<Connection>>;

pub struct ThumbnailStore {
    path: PathBuf,
    version: u32,
    state: Arc<Mutex<StoreState>>,
    conn: RwLock<Option<SharedConnection>>,
}

impl ThumbnailStore {
    /// Describe a store; nothing touches the disk until [`open`](Self::open).
    pub fn new(dir: &Path, name: &str, version: u32) -> Self {
        Self {
            path: dir.join(format!("{name}.sqlite3")),
            version,
            state: Arc::new(Mutex::new(StoreState::Unopened)),
            conn: RwLock::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn state(&self) -> StoreState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Open or create the store, upgrading the schema if needed.
    ///
    /// Calling this on a `Ready` store is a no-op.
    pub async fn open(&self) -> Result<OpenOutcome, StoreError> {
        let mut slot = self.conn.write().await;
        if slot.is_some() {
            return Ok(OpenOutcome::AlreadyOpen);
        }
        self.open_into(&mut slot).await
    }

    async fn open_into(
        &self,
        slot: &mut Option<SharedConnection>,
    ) -> Result<OpenOutcome, StoreError> {
        set_state(&self.state, StoreState::Opening);

        let path = self.path.clone();
        let version = self.version;
        let state = Arc::clone(&self.state);
        let opened = run_blocking(move || connect(&path, version, &state)).await;

        match opened {
            Ok((conn, outcome)) => {
                *slot = Some(Arc::new(Mutex::new(conn)));
                set_state(&self.state, StoreState::Ready);
                Ok(outcome)
            }
            Err(e) => {
                set_state(&self.state, StoreState::Unopened);
                Err(e)
            }
        }
    }

    /// Insert or overwrite the value stored under `key`.
    pub async fn put(&self, key: &ThumbnailKey, value: &str) -> Result<(), StoreError> {
        let key = key.as_str().to_string();
        let value = value.to_string();
        self.with_connection(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO images (key, value) VALUES (?1, ?2)",
                params![key, value],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn get(&self, key: &ThumbnailKey) -> Result<Option<String>, StoreError> {
        let key = key.as_str().to_string();
        self.with_connection(move |conn| {
            let value = conn
                .query_row(
                    "SELECT value FROM images WHERE key = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(value)
        })
        .await
    }

    /// Every record, in key order.
    ///
    /// The traversal runs to the last row before anything is returned; an
    /// error at any row fails the whole call.
    pub async fn enumerate_all(&self) -> Result<Vec<StoreRecord>, StoreError> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare("SELECT key, value FROM images ORDER BY key")?;
            let rows = stmt.query_map([], |row| {
                Ok(StoreRecord {
                    key: ThumbnailKey::from(row.get::<_, String>(0)?),
                    value: row.get(1)?,
                })
            })?;
            let records = rows.collect::<Result<Vec<_>, _>>()?;
            Ok(records)
        })
        .await
    }

    /// Delete the whole store and open a fresh, empty one.
    ///
    /// Returns once the new store is `Ready`.
    pub async fn reset(&self) -> Result<OpenOutcome, StoreError> {
        let mut slot = self.conn.write().await;
        slot.take();
        set_state(&self.state, StoreState::Closed);

        let path = self.path.clone();
        run_blocking(move || delete_store_files(&path)).await?;

        self.open_into(&mut slot).await
    }

    /// Drop the connection. Later reads and writes fail until reopened.
    pub async fn close(&self) {
        let mut slot = self.conn.write().await;
        if slot.take().is_some() {
            set_state(&self.state, StoreState::Closed);
        }
    }

    /// Run `f` against the connection on the blocking pool.
    ///
    /// The lifecycle read lock is held until `f` finishes, so a concurrent
    /// `reset` cannot pull the connection out from under it.
    async fn with_connection<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let slot = self.conn.read().await;
        let Some(shared) = slot.as_ref().map(Arc::clone) else {
            return Err(StoreError::NotReady(self.state()));
        };

        let result = run_blocking(move || {
            let mut conn = shared
                .lock()
                .map_err(|_| StoreError::Worker("connection lock poisoned".into()))?;
            f(&mut conn)
        })
        .await;

        drop(slot);
        result
    }
}

fn set_state(state: &Mutex<StoreState>, next: StoreState) {
    *state.lock().unwrap_or_else(PoisonError::into_inner) = next;
}

async fn run_blocking<T, F>(f: F) -> Result<T, StoreError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| StoreError::Worker(e.to_string()))?
}

fn connect(
    path: &Path,
    version: u32,
    state: &Mutex<StoreState>,
) -> Result<(Connection, OpenOutcome), StoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode = WAL;")?;

    let existing: u32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if existing > version {
        return Err(StoreError::VersionDowngrade {
            existing,
            requested: version,
        });
    }
    if existing == version {
        return Ok((conn, OpenOutcome::Opened));
    }

    set_state(state, StoreState::Upgrading);
    upgrade(&mut conn, version)?;
    Ok((
        conn,
        OpenOutcome::Upgraded {
            from: existing,
            to: version,
        },
    ))
}

/// Create the collection and stamp the version in one transaction.
fn upgrade(conn: &mut Connection, version: u32) -> Result<(), StoreError> {
    let tx = conn.transaction()?;
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS images (
            key    TEXT PRIMARY KEY,
            value  TEXT NOT NULL
        );",
    )?;
    tx.execute_batch(&format!("PRAGMA user_version = {version};"))?;
    tx.commit()?;
    Ok(())
}

fn delete_store_files(path: &Path) -> Result<(), StoreError> {
    remove_if_exists(path)?;
    for suffix in SIDECAR_SUFFIXES {
        let mut sidecar = path.as_os_str().to_owned();
        sidecar.push(suffix);
        remove_if_exists(Path::new(&sidecar))?;
    }
    Ok(())
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
