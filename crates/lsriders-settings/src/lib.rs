//! # lsriders-settings
//!
//! Configuration management with layered sources for the lsriders backend.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`LsridersSettings::default()`]
//! 2. **User file**: `~/.lsriders/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `LSRIDERS_*` overrides (highest priority)

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    apply_env_overrides, apply_overrides_from, deep_merge, load_settings,
    load_settings_from_path, settings_dir, settings_path,
};
pub use types::*;
