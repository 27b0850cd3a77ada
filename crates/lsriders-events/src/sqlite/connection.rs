//! Pooled `SQLite` handles for the events database.
//!
//! Every connection handed out by the pool has had [`EventPragmas`] applied:
//! WAL journaling, the configured busy timeout and page cache, and foreign
//! keys on.

use std::time::Duration;

use lsriders_settings::DatabaseSettings;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

use crate::errors::Result;

/// Pool of events-database connections.
pub type ConnectionPool = Pool<SqliteConnectionManager>;

/// One connection checked out of a [`ConnectionPool`].
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// How long a request waits for a free connection.
const CHECKOUT_TIMEOUT: Duration = Duration::from_secs(5);

/// Pool sizing and per-connection tuning.
#[derive(Clone, Debug)]
pub struct ConnectionConfig {
    /// Upper bound on open connections for a file database.
    pub pool_size: u32,
    /// How long a writer waits on a locked database, in milliseconds.
    pub busy_timeout_ms: u32,
    /// Page cache per connection, in KiB.
    pub cache_size_kib: i64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            pool_size: 16,
            busy_timeout_ms: 30_000,
            cache_size_kib: 8192,
        }
    }
}

impl From<&DatabaseSettings> for ConnectionConfig {
    fn from(settings: &DatabaseSettings) -> Self {
        Self {
            pool_size: settings.pool_size.max(1),
            busy_timeout_ms: settings.busy_timeout_ms,
            cache_size_kib: settings.cache_size_kib,
        }
    }
}

#[derive(Debug)]
struct EventPragmas {
    busy_timeout_ms: u32,
    cache_size_kib: i64,
}

impl EventPragmas {
    fn script(&self) -> String {
        // Negative cache_size is KiB rather than pages.
        format!(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = {};
             PRAGMA cache_size = -{};",
            self.busy_timeout_ms, self.cache_size_kib
        )
    }
}

impl r2d2::CustomizeConnection<Connection, rusqlite::Error> for EventPragmas {
    fn on_acquire(&self, conn: &mut Connection) -> rusqlite::Result<()> {
        conn.execute_batch(&self.script())
    }
}

fn pool(
    manager: SqliteConnectionManager,
    max_size: u32,
    config: &ConnectionConfig,
) -> Result<ConnectionPool> {
    let pragmas = EventPragmas {
        busy_timeout_ms: config.busy_timeout_ms,
        cache_size_kib: config.cache_size_kib,
    };
    Ok(Pool::builder()
        .max_size(max_size)
        .connection_timeout(CHECKOUT_TIMEOUT)
        .connection_customizer(Box::new(pragmas))
        .build(manager)?)
}

/// Pool over a private in-memory database.
///
/// Each `SQLite` memory connection is a separate database, so this pool never
/// opens more than one, whatever `config.pool_size` says.
pub fn new_in_memory(config: &ConnectionConfig) -> Result<ConnectionPool> {
    pool(SqliteConnectionManager::memory(), 1, config)
}

/// Pool over the database file at `path`, created if missing.
pub fn new_file(path: &str, config: &ConnectionConfig) -> Result<ConnectionPool> {
    pool(SqliteConnectionManager::file(path), config.pool_size, config)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn pragma<T: rusqlite::types::FromSql>(conn: &Connection, name: &str) -> T {
        conn.query_row(&format!("PRAGMA {name}"), [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn in_memory_pool_is_single_connection() {
        let pool = new_in_memory(&ConnectionConfig::default()).unwrap();
        assert_eq!(pool.max_size(), 1);
        let conn = pool.get().unwrap();
        // Memory databases cannot use WAL and keep their own journal mode.
        assert_eq!(pragma::<String>(&conn, "journal_mode"), "memory");
        assert_eq!(pragma::<i64>(&conn, "foreign_keys"), 1);
    }

    #[test]
    fn file_pool_uses_wal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.db");
        let config = ConnectionConfig {
            pool_size: 4,
            ..Default::default()
        };
        let pool = new_file(path.to_str().unwrap(), &config).unwrap();
        assert_eq!(pool.max_size(), 4);
        let conn = pool.get().unwrap();
        assert_eq!(pragma::<String>(&conn, "journal_mode"), "wal");
        assert_eq!(pragma::<i64>(&conn, "foreign_keys"), 1);
        assert_eq!(pragma::<i64>(&conn, "busy_timeout"), 30_000);
        assert_eq!(pragma::<i64>(&conn, "cache_size"), -8192);
    }

    #[test]
    fn config_from_settings() {
        let settings = DatabaseSettings {
            pool_size: 0,
            busy_timeout_ms: 1000,
            ..Default::default()
        };
        let config = ConnectionConfig::from(&settings);
        assert_eq!(config.pool_size, 1);
        assert_eq!(config.busy_timeout_ms, 1000);
        assert_eq!(config.cache_size_kib, 8192);
    }
}
