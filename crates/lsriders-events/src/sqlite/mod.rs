//! `SQLite` backend for the event access layer.
//!
//! # Architecture
//!
//! - **[`connection`]**: `r2d2` connection pool with WAL mode, foreign keys, and
//!   performance pragmas applied to every connection.
//! - **[`migrations`]**: Version-tracked schema evolution. Migrations are embedded
//!   at compile time and run transactionally.
//! - **[`repositories`]**: Stateless repository structs. Each method takes
//!   `&Connection` and executes SQL.
//! - **[`pooled`]**: [`SqliteEventRepository`], which checks a connection out of
//!   the pool per call and delegates to the stateless repo.

pub mod connection;
pub mod migrations;
pub mod pooled;
pub mod repositories;

pub use connection::{ConnectionConfig, ConnectionPool, PooledConnection, new_file, new_in_memory};
pub use migrations::run_migrations;
pub use pooled::SqliteEventRepository;
