//! Storage capability set behind the [`EventStore`](crate::store::EventStore).
//!
//! Implementations only move rows; identity rules, input validation and date
//! normalization live in the store. Filter results come back in natural
//! storage order (`id` ascending).

use crate::errors::Result;
use crate::types::{DateBound, Event, EventId, EventSummary, Page, SortOrder};

/// Persistence primitives for events.
#[cfg_attr(test, mockall::automock)]
pub trait EventRepository: Send + Sync {
    /// Persist a new event, returning the stored copy with its fresh id.
    /// Any id already on `event` is ignored.
    fn insert(&self, event: &Event) -> Result<Event>;

    /// Replace the record `id` wholesale. Returns `false` if no such record.
    fn replace(&self, id: EventId, event: &Event) -> Result<bool>;

    /// Look up one event.
    fn find_by_id(&self, id: EventId) -> Result<Option<Event>>;

    /// Hard-delete one event. Returns `false` if it did not exist.
    fn delete_by_id(&self, id: EventId) -> Result<bool>;

    /// One slice of all events under `sort` (then `id`).
    fn find_page(&self, offset: u64, limit: u64, sort: &[SortOrder]) -> Result<Vec<Event>>;

    /// Like [`find_page`](Self::find_page), with the total count read from
    /// the same snapshot.
    fn find_page_with_total(&self, offset: u64, limit: u64, sort: &[SortOrder]) -> Result<Page>;

    /// Summary projection of all events under `sort` (then `id`).
    fn find_summaries(&self, sort: &[SortOrder]) -> Result<Vec<EventSummary>>;

    /// Events strictly on one side of an instant.
    fn find_by_date(&self, bound: DateBound) -> Result<Vec<Event>>;

    /// Events whose name equals `name` exactly.
    fn find_by_name(&self, name: &str) -> Result<Vec<Event>>;

    /// Events whose creator login equals `login`.
    fn find_by_creator(&self, login: &str) -> Result<Vec<Event>>;

    /// Total number of stored events.
    fn count(&self) -> Result<u64>;
}
