//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`LsridersSettings::default()`]
//! 2. If the settings file exists, deep-merge its values over the defaults
//! 3. Apply `LSRIDERS_*` environment overrides (highest priority)
//! 4. [`LsridersSettings::validate`] corrects inconsistent values
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::{LogFormat, LsridersSettings};

/// Resolve the settings directory (`~/.lsriders`).
pub fn settings_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".lsriders")
}

/// Resolve the path to the settings file (`~/.lsriders/settings.json`).
pub fn settings_path() -> PathBuf {
    settings_dir().join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<LsridersSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// A missing file yields defaults. A file with invalid JSON is an error.
pub fn load_settings_from_path(path: &Path) -> Result<LsridersSettings> {
    let defaults = serde_json::to_value(LsridersSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: LsridersSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    settings.validate();
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply `LSRIDERS_*` environment variable overrides.
pub fn apply_env_overrides(settings: &mut LsridersSettings) {
    apply_overrides_from(settings, |name| std::env::var(name).ok());
}

/// Apply overrides read through `lookup`.
///
/// Invalid values are ignored with a warning, keeping the file/default value.
pub fn apply_overrides_from(
    settings: &mut LsridersSettings,
    lookup: impl Fn(&str) -> Option<String>,
) {
    // ── Server ──────────────────────────────────────────────────────
    if let Some(v) = read_string(&lookup, "LSRIDERS_HOST") {
        settings.server.host = v;
    }
    if let Some(v) = read_parsed(&lookup, "LSRIDERS_PORT", |v| parse_u16_range(v, 0, 65535)) {
        settings.server.port = v;
    }

    // ── Database ────────────────────────────────────────────────────
    if let Some(v) = read_string(&lookup, "LSRIDERS_DB_PATH") {
        settings.database.path = v;
    }
    if let Some(v) = read_parsed(&lookup, "LSRIDERS_POOL_SIZE", |v| parse_u32_range(v, 1, 256)) {
        settings.database.pool_size = v;
    }

    // ── Events ──────────────────────────────────────────────────────
    if let Some(v) = read_parsed(&lookup, "LSRIDERS_DEFAULT_PAGE_SIZE", |v| {
        parse_u32_range(v, 1, 100_000)
    }) {
        settings.events.default_page_size = v;
    }
    if let Some(v) = read_parsed(&lookup, "LSRIDERS_MAX_PAGE_SIZE", |v| {
        parse_u32_range(v, 1, 100_000)
    }) {
        settings.events.max_page_size = v;
    }
    if let Some(v) = read_string(&lookup, "LSRIDERS_TIME_ZONE") {
        settings.events.time_zone = v;
    }

    // ── Logging / auth ──────────────────────────────────────────────
    if let Some(v) = read_string(&lookup, "LSRIDERS_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = read_parsed(&lookup, "LSRIDERS_LOG_FORMAT", parse_log_format) {
        settings.logging.format = v;
    }
    if let Some(v) = read_string(&lookup, "LSRIDERS_PRINCIPAL_HEADER") {
        settings.auth.principal_header = v.to_ascii_lowercase();
    }
}

fn read_string(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name).filter(|v| !v.is_empty())
}

fn read_parsed<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    let val = read_string(lookup, name)?;
    let result = parse(&val);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid env var, ignoring");
    }
    result
}

// ── Pure parsing functions ──────────────────────────────────────────────────

/// Parse a string as a `u16` within a range.
pub fn parse_u16_range(val: &str, min: u16, max: u16) -> Option<u16> {
    let n: u16 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `u32` within a range.
pub fn parse_u32_range(val: &str, min: u32, max: u32) -> Option<u32> {
    let n: u32 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a log format name (case-insensitive).
pub fn parse_log_format(val: &str) -> Option<LogFormat> {
    match val.to_lowercase().as_str() {
        "compact" => Some(LogFormat::Compact),
        "json" => Some(LogFormat::Json),
        _ => None,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
