//! High-level `EventStore` API.
//!
//! The [`EventStore`] sits on top of an [`EventRepository`](crate::repository::EventRepository)
//! and owns the rules the repositories do not: identity checks on create and
//! update, paging bounds, date-threshold parsing and timestamp normalization.

mod event_store;

pub use event_store::*;
