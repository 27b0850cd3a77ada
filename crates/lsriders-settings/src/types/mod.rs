//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]`. Each type implements
//! [`Default`] with production values, and `#[serde(default)]` lets a partial
//! JSON file fill in only the fields it cares about.

mod server;

pub use server::*;

use serde::{Deserialize, Serialize};

/// Root settings type for the lsriders backend.
///
/// ```json
/// {
///   "server": { "port": 9090 },
///   "events": { "timeZone": "Europe/Madrid" }
/// }
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LsridersSettings {
    /// HTTP listener settings.
    pub server: ServerSettings,
    /// `SQLite` database and pool settings.
    pub database: DatabaseSettings,
    /// Event query behavior (paging, time zone, summary ordering).
    pub events: EventSettings,
    /// Logging configuration.
    pub logging: LoggingSettings,
    /// How the authenticated principal reaches the backend.
    pub auth: AuthSettings,
}

impl LsridersSettings {
    /// Correct inconsistent values in place.
    ///
    /// Called automatically during loading. Bad values are corrected with a
    /// warning instead of failing startup.
    pub fn validate(&mut self) {
        let ev = &mut self.events;
        if ev.max_page_size == 0 {
            tracing::warn!("events.maxPageSize is 0, using default");
            ev.max_page_size = EventSettings::default().max_page_size;
        }
        if ev.default_page_size == 0 {
            tracing::warn!("events.defaultPageSize is 0, using default");
            ev.default_page_size = EventSettings::default().default_page_size;
        }
        if ev.default_page_size > ev.max_page_size {
            tracing::warn!(
                "events.defaultPageSize ({}) > maxPageSize ({}), correcting",
                ev.default_page_size,
                ev.max_page_size
            );
            ev.default_page_size = ev.max_page_size;
        }
        if self.database.pool_size == 0 {
            tracing::warn!("database.poolSize is 0, using 1");
            self.database.pool_size = 1;
        }
    }
}

/// Event query behavior.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventSettings {
    /// Page size used when a request omits it or passes 0.
    pub default_page_size: u32,
    /// Upper bound for a requested page size.
    pub max_page_size: u32,
    /// Zone used to turn a `yyyy-MM-dd` threshold into an instant.
    /// `"local"` uses the system zone, anything else must be an IANA name.
    pub time_zone: String,
    /// Sort orders for the summary listing, each `"field"` or `"field,dir"`.
    pub summary_sort: Vec<String>,
}

impl Default for EventSettings {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 2000,
            time_zone: "local".to_string(),
            summary_sort: vec![
                "km,asc".to_string(),
                "name,asc".to_string(),
                "description,asc".to_string(),
            ],
        }
    }
}

/// Log output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Single-line human readable output.
    #[default]
    Compact,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}

/// Principal propagation settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthSettings {
    /// Request header carrying the authenticated login, set by the
    /// upstream authentication gateway.
    pub principal_header: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            principal_header: "x-auth-login".to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
