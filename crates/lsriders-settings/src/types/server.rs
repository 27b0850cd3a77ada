//! Server and database settings.

use serde::{Deserialize, Serialize};

/// HTTP listener settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    /// Bind port (0 picks a free port).
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// `SQLite` database and connection pool settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatabaseSettings {
    /// Database file path (relative to `~/.lsriders` unless absolute).
    pub path: String,
    /// Maximum pool size.
    pub pool_size: u32,
    /// `SQLite` busy timeout in milliseconds.
    pub busy_timeout_ms: u32,
    /// Page cache size in KiB.
    pub cache_size_kib: i64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: "lsriders.db".to_string(),
            pool_size: 16,
            busy_timeout_ms: 30_000,
            cache_size_kib: 8192,
        }
    }
}
