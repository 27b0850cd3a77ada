//! Repository implementations for `SQLite` database operations.
//!
//! Each repository is a stateless struct whose methods take a `&Connection`
//! parameter, so every operation can be exercised against a bare migrated
//! connection without a pool.

pub mod event;
