//! In-memory reference implementation of [`EventRepository`].
//!
//! Rows live in a `BTreeMap` keyed by id, so iteration order is the natural
//! storage order. Ids come from a counter that only moves forward, which keeps
//! deleted ids from being reused.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::errors::Result;
use crate::repository::EventRepository;
use crate::types::{DateBound, Event, EventId, EventSummary, Page, SortOrder, compare_events};

#[derive(Debug)]
struct MemoryState {
    rows: BTreeMap<EventId, Event>,
    last_id: EventId,
}

/// Event repository backed by process memory.
#[derive(Debug)]
pub struct InMemoryEventRepository {
    state: RwLock<MemoryState>,
}

impl InMemoryEventRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState {
                rows: BTreeMap::new(),
                last_id: 0,
            }),
        }
    }

    fn filter(&self, keep: impl Fn(&Event) -> bool) -> Vec<Event> {
        self.state
            .read()
            .rows
            .values()
            .filter(|e| keep(e))
            .cloned()
            .collect()
    }

    fn sorted(&self, sort: &[SortOrder]) -> Vec<Event> {
        sort_rows(&self.state.read().rows, sort)
    }
}

fn sort_rows(rows: &BTreeMap<EventId, Event>, sort: &[SortOrder]) -> Vec<Event> {
    let mut events: Vec<Event> = rows.values().cloned().collect();
    events.sort_by(|a, b| compare_events(a, b, sort));
    events
}

fn slice(events: Vec<Event>, offset: u64, limit: u64) -> Vec<Event> {
    let skip = usize::try_from(offset).unwrap_or(usize::MAX);
    let take = usize::try_from(limit).unwrap_or(usize::MAX);
    events.into_iter().skip(skip).take(take).collect()
}

impl Default for InMemoryEventRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl EventRepository for InMemoryEventRepository {
    fn insert(&self, event: &Event) -> Result<Event> {
        let mut state = self.state.write();
        let id = state.last_id + 1;
        state.last_id = id;
        let stored = Event {
            id: Some(id),
            ..event.clone()
        };
        let _ = state.rows.insert(id, stored.clone());
        Ok(stored)
    }

    fn replace(&self, id: EventId, event: &Event) -> Result<bool> {
        let mut state = self.state.write();
        match state.rows.get_mut(&id) {
            Some(row) => {
                *row = Event {
                    id: Some(id),
                    ..event.clone()
                };
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn find_by_id(&self, id: EventId) -> Result<Option<Event>> {
        Ok(self.state.read().rows.get(&id).cloned())
    }

    fn delete_by_id(&self, id: EventId) -> Result<bool> {
        Ok(self.state.write().rows.remove(&id).is_some())
    }

    fn find_page(&self, offset: u64, limit: u64, sort: &[SortOrder]) -> Result<Vec<Event>> {
        Ok(slice(self.sorted(sort), offset, limit))
    }

    fn find_page_with_total(&self, offset: u64, limit: u64, sort: &[SortOrder]) -> Result<Page> {
        let state = self.state.read();
        let total = state.rows.len() as u64;
        let events = slice(sort_rows(&state.rows, sort), offset, limit);
        Ok(Page { events, total })
    }

    fn find_summaries(&self, sort: &[SortOrder]) -> Result<Vec<EventSummary>> {
        Ok(self.sorted(sort).iter().map(EventSummary::from).collect())
    }

    fn find_by_date(&self, bound: DateBound) -> Result<Vec<Event>> {
        Ok(self.filter(|e| bound.matches(&e.date)))
    }

    fn find_by_name(&self, name: &str) -> Result<Vec<Event>> {
        Ok(self.filter(|e| e.name == name))
    }

    fn find_by_creator(&self, login: &str) -> Result<Vec<Event>> {
        Ok(self.filter(|e| e.creator.as_deref() == Some(login)))
    }

    fn count(&self) -> Result<u64> {
        Ok(self.state.read().rows.len() as u64)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
