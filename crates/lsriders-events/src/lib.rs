//! # lsriders-events
//!
//! Event access layer for the lsriders backend.
//!
//! - **Data model**: [`Event`], its [`EventSummary`] projection, sort orders and
//!   page requests
//! - **Event store**: [`EventStore`] enforces identity rules, paging bounds and
//!   date-threshold semantics on top of a repository
//! - **Repositories**: [`EventRepository`] with a pooled `SQLite` implementation
//!   and an in-memory one
//! - **Migrations**: Version-tracked SQL schema evolution

#![deny(unsafe_code)]

pub mod dates;
pub mod errors;
pub mod memory;
pub mod repository;
pub mod sqlite;
pub mod store;
pub mod types;

pub use dates::{DateZone, parse_threshold};
pub use errors::{ErrorKind, EventStoreError, Result};
pub use memory::InMemoryEventRepository;
pub use repository::EventRepository;
pub use sqlite::{ConnectionConfig, ConnectionPool, SqliteEventRepository, run_migrations};
pub use store::{EventStore, EventStoreConfig};
pub use types::{
    DateBound, Event, EventId, EventSummary, Page, PageRequest, Principal, SortDirection,
    SortField, SortOrder,
};
