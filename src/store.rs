//! Durable favorites collection.
//!
//! Favorites live in a single SQLite file. The schema is versioned through
//! `PRAGMA user_version` and created on the first open at the current
//! version. Each operation runs in its own transaction on the blocking pool.

use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::error::{AppError, Result};
use crate::models::Movie;

pub const DB_FILE_NAME: &str = "movie_app.db";
pub const STORE_NAME: &str = "favorites";
pub const SCHEMA_VERSION: i32 = 2;

#[async_trait]
pub trait FavoritesRepository: Send + Sync {
    /// Inserts or replaces the record keyed by `movie.id`.
    async fn add(&self, movie: &Movie) -> Result<()>;

    /// Deletes the record for `movie_id`. Absent ids are not an error.
    async fn remove(&self, movie_id: i64) -> Result<()>;

    async fn get_all(&self) -> Result<Vec<Movie>>;

    async fn is_favorite(&self, movie_id: i64) -> Result<bool>;
}

#[derive(Debug, Clone)]
enum Location {
    File(PathBuf),
    Memory,
}

pub struct SqliteFavoritesStore {
    location: Location,
    conn: OnceCell<Arc<Mutex<Connection>>>,
}

impl SqliteFavoritesStore {
    /// Store backed by the database file at `path`. Nothing is opened until
    /// the first operation (or an explicit [`open`](Self::open)).
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            location: Location::File(path.as_ref().to_path_buf()),
            conn: OnceCell::new(),
        }
    }

    /// Create an in-memory store (for testing)
    pub fn new_in_memory() -> Self {
        Self {
            location: Location::Memory,
            conn: OnceCell::new(),
        }
    }

    /// Opens the database and brings the schema up to date. Safe to call
    /// repeatedly; later calls return the same connection.
    pub async fn open(&self) -> Result<Arc<Mutex<Connection>>> {
        let conn = self
            .conn
            .get_or_try_init(|| async {
                let location = self.location.clone();
                let conn = tokio::task::spawn_blocking(move || open_connection(&location))
                    .await
                    .map_err(|e| AppError::StorageUnavailable(e.to_string()))??;
                Ok::<_, AppError>(Arc::new(Mutex::new(conn)))
            })
            .await?;

        Ok(Arc::clone(conn))
    }

    async fn run<T, F>(&self, on_error: fn(String) -> AppError, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> rusqlite::Result<T> + Send + 'static,
    {
        let conn = self.open().await?;

        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock();
            op(&mut conn)
        })
        .await
        .map_err(|e| on_error(e.to_string()))?
        .map_err(|e| on_error(e.to_string()))
    }
}

fn open_connection(location: &Location) -> Result<Connection> {
    let conn = match location {
        Location::File(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::StorageUnavailable(format!(
                        "cannot create {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
            Connection::open(path)
        }
        Location::Memory => Connection::open_in_memory(),
    }
    .map_err(|e| AppError::StorageUnavailable(e.to_string()))?;

    upgrade(&conn)?;
    Ok(conn)
}

fn upgrade(conn: &Connection) -> Result<()> {
    let version: i32 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|e| AppError::StorageUnavailable(e.to_string()))?;

    if version > SCHEMA_VERSION {
        return Err(AppError::StorageUnavailable(format!(
            "database schema version {} is newer than supported version {}",
            version, SCHEMA_VERSION
        )));
    }

    if version < 1 {
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {STORE_NAME} (
                id INTEGER PRIMARY KEY,
                record TEXT NOT NULL,
                added_at INTEGER NOT NULL,
                seq INTEGER NOT NULL
            );"
        ))
        .map_err(|e| AppError::StorageUnavailable(e.to_string()))?;
    } else if version < 2 {
        // version 1 ordered by added_at alone; number the existing rows in that order
        conn.execute_batch(&format!(
            "ALTER TABLE {STORE_NAME} ADD COLUMN seq INTEGER NOT NULL DEFAULT 0;
            UPDATE {STORE_NAME} SET seq = (
                SELECT COUNT(*) FROM {STORE_NAME} AS earlier
                WHERE earlier.added_at < {STORE_NAME}.added_at
                   OR (earlier.added_at = {STORE_NAME}.added_at AND earlier.id <= {STORE_NAME}.id)
            );"
        ))
        .map_err(|e| AppError::StorageUnavailable(e.to_string()))?;
    }

    if version < SCHEMA_VERSION {
        conn.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))
            .map_err(|e| AppError::StorageUnavailable(e.to_string()))?;

        info!(
            "Upgraded favorites database from version {} to {}",
            version, SCHEMA_VERSION
        );
    }

    Ok(())
}

#[async_trait]
impl FavoritesRepository for SqliteFavoritesStore {
    async fn add(&self, movie: &Movie) -> Result<()> {
        let id = movie.id;
        let record = serde_json::to_string(movie)?;
        let added_at = chrono::Utc::now().timestamp_millis();

        self.run(AppError::StorageWriteError, move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            tx.execute(
                &format!(
                    "INSERT INTO {STORE_NAME} (id, record, added_at, seq)
                     VALUES (?1, ?2, ?3, (SELECT COALESCE(MAX(seq), 0) + 1 FROM {STORE_NAME}))
                     ON CONFLICT(id) DO UPDATE SET record = excluded.record"
                ),
                params![id, record, added_at],
            )?;
            tx.commit()
        })
        .await?;

        debug!("Stored favorite {}", id);
        Ok(())
    }

    async fn remove(&self, movie_id: i64) -> Result<()> {
        let rows_affected = self
            .run(AppError::StorageWriteError, move |conn| {
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
                let rows = tx.execute(
                    &format!("DELETE FROM {STORE_NAME} WHERE id = ?1"),
                    params![movie_id],
                )?;
                tx.commit()?;
                Ok(rows)
            })
            .await?;

        if rows_affected > 0 {
            debug!("Removed favorite {}", movie_id);
        } else {
            debug!("Favorite {} was not stored, nothing to remove", movie_id);
        }

        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<Movie>> {
        let records = self
            .run(AppError::StorageReadError, |conn| {
                let tx = conn.transaction_with_behavior(TransactionBehavior::Deferred)?;
                let records = {
                    let mut stmt =
                        tx.prepare(&format!("SELECT record FROM {STORE_NAME} ORDER BY seq ASC"))?;
                    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
                    rows.collect::<rusqlite::Result<Vec<String>>>()?
                };
                tx.commit()?;
                Ok(records)
            })
            .await?;

        let mut movies = Vec::with_capacity(records.len());
        for record in records {
            match serde_json::from_str::<Movie>(&record) {
                Ok(movie) => movies.push(movie),
                Err(e) => {
                    warn!("Corrupt favorite record: {}", e);
                    return Err(AppError::StorageReadError(format!(
                        "corrupt favorite record: {}",
                        e
                    )));
                }
            }
        }

        Ok(movies)
    }

    async fn is_favorite(&self, movie_id: i64) -> Result<bool> {
        self.run(AppError::StorageReadError, move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Deferred)?;
            let found = tx
                .query_row(
                    &format!("SELECT 1 FROM {STORE_NAME} WHERE id = ?1"),
                    params![movie_id],
                    |_| Ok(()),
                )
                .optional()?
                .is_some();
            tx.commit()?;
            Ok(found)
        })
        .await
    }
}
