//! `SQLite` plumbing for the mapping store.
//!
//! The store lives in one local file holding client mappings, alert-ticket
//! mappings and ticketing configs. Tests open a private in-memory copy.

use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, Sqlite};
use tracing::{debug, info};

/// How long a writer waits on a locked store before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const FILE_POOL_SIZE: u32 = 4;

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Cannot create store directory: {0}")]
    Io(String),

    #[error("Cannot open store: {0}")]
    Connection(String),

    #[error("Store migration failed: {0}")]
    Migration(String),

    /// A row with the same key is already recorded.
    #[error("Already recorded: {0}")]
    Duplicate(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(e: sqlx::Error) -> Self {
        match e.as_database_error() {
            Some(db_err) if db_err.is_unique_violation() => {
                Self::Duplicate(db_err.message().to_string())
            }
            _ => Self::Query(e.to_string()),
        }
    }
}

/// Where a store's rows are kept.
#[derive(Debug, Clone, Copy)]
pub enum StoreLocation<'a> {
    File(&'a Path),
    /// Private to the returned pool and gone once it closes.
    Memory,
}

/// Connect to the store, creating the file (and its directory) on first use.
pub async fn connect(location: StoreLocation<'_>) -> Result<Pool<Sqlite>, DatabaseError> {
    let (options, pool_options) = match location {
        StoreLocation::File(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| DatabaseError::Io(e.to_string()))?;
            }
            let options = SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
                .busy_timeout(BUSY_TIMEOUT);
            (options, SqlitePoolOptions::new().max_connections(FILE_POOL_SIZE))
        }
        StoreLocation::Memory => {
            // Every connection to ":memory:" is a separate database, so the
            // pool keeps exactly one and never recycles or pings it.
            let options = SqliteConnectOptions::new().in_memory(true);
            let pool_options = SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .test_before_acquire(false);
            (options, pool_options)
        }
    };

    let pool = pool_options
        .connect_with(options)
        .await
        .map_err(|e| DatabaseError::Connection(e.to_string()))?;

    match location {
        StoreLocation::File(path) => info!(path = %path.display(), "Mapping store opened"),
        StoreLocation::Memory => debug!("In-memory mapping store opened"),
    }
    Ok(pool)
}

/// Seconds since the Unix epoch, as stored in `created_at`/`closed_at` columns.
pub fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
}

/// Define a store handle type wrapping a migrated pool.
///
/// ```ignore
/// alertbridge_core::define_database!(Database, "Mapping store migrations complete");
/// ```
///
/// The type gets `open(path)`, `open_in_memory()`, `pool()` and `close()`.
/// Migrations come from `./migrations` in the invoking crate.
#[macro_export]
macro_rules! define_database {
    ($name:ident, $migration_msg:expr) => {
        #[derive(Clone)]
        pub struct $name {
            pool: ::sqlx::Pool<::sqlx::Sqlite>,
        }

        impl $name {
            /// Open or create the store file at `path`.
            pub async fn open(
                path: &::std::path::Path,
            ) -> ::std::result::Result<Self, $crate::db::DatabaseError> {
                Self::connect($crate::db::StoreLocation::File(path)).await
            }

            /// Open a throwaway store held in memory.
            pub async fn open_in_memory() -> ::std::result::Result<Self, $crate::db::DatabaseError>
            {
                Self::connect($crate::db::StoreLocation::Memory).await
            }

            async fn connect(
                location: $crate::db::StoreLocation<'_>,
            ) -> ::std::result::Result<Self, $crate::db::DatabaseError> {
                let pool = $crate::db::connect(location).await?;
                let migrator = ::sqlx::migrate!("./migrations");
                migrator
                    .run(&pool)
                    .await
                    .map_err(|e| $crate::db::DatabaseError::Migration(e.to_string()))?;
                ::tracing::info!(migrations = migrator.iter().count(), $migration_msg);
                Ok(Self { pool })
            }

            pub const fn pool(&self) -> &::sqlx::Pool<::sqlx::Sqlite> {
                &self.pool
            }

            /// Flush the WAL and release every connection.
            pub async fn close(&self) {
                self.pool.close().await;
            }
        }
    };
}
