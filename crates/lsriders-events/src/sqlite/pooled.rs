//! Pool-backed [`EventRepository`] implementation.

use crate::errors::Result;
use crate::repository::EventRepository;
use crate::sqlite::connection::{ConnectionPool, PooledConnection};
use crate::sqlite::migrations::run_migrations;
use crate::sqlite::repositories::event::EventRepo;
use crate::types::{DateBound, Event, EventId, EventSummary, Page, SortOrder};

/// Event repository over an `r2d2` `SQLite` pool.
#[derive(Clone)]
pub struct SqliteEventRepository {
    pool: ConnectionPool,
}

impl SqliteEventRepository {
    /// Wrap a pool whose schema is already migrated.
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    /// Run pending migrations, then wrap the pool.
    pub fn initialize(pool: ConnectionPool) -> Result<Self> {
        let conn = pool.get()?;
        let _ = run_migrations(&conn)?;
        drop(conn);
        Ok(Self { pool })
    }

    /// The underlying pool.
    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    fn conn(&self) -> Result<PooledConnection> {
        Ok(self.pool.get()?)
    }
}

impl EventRepository for SqliteEventRepository {
    fn insert(&self, event: &Event) -> Result<Event> {
        let id = EventRepo::insert(&*self.conn()?, event)?;
        Ok(Event {
            id: Some(id),
            ..event.clone()
        })
    }

    fn replace(&self, id: EventId, event: &Event) -> Result<bool> {
        EventRepo::replace(&*self.conn()?, id, event)
    }

    fn find_by_id(&self, id: EventId) -> Result<Option<Event>> {
        EventRepo::get_by_id(&*self.conn()?, id)
    }

    fn delete_by_id(&self, id: EventId) -> Result<bool> {
        EventRepo::delete(&*self.conn()?, id)
    }

    fn find_page(&self, offset: u64, limit: u64, sort: &[SortOrder]) -> Result<Vec<Event>> {
        EventRepo::list_page(&*self.conn()?, offset, limit, sort)
    }

    fn find_page_with_total(&self, offset: u64, limit: u64, sort: &[SortOrder]) -> Result<Page> {
        EventRepo::list_page_with_total(&*self.conn()?, offset, limit, sort)
    }

    fn find_summaries(&self, sort: &[SortOrder]) -> Result<Vec<EventSummary>> {
        EventRepo::list_summaries(&*self.conn()?, sort)
    }

    fn find_by_date(&self, bound: DateBound) -> Result<Vec<Event>> {
        EventRepo::list_by_date(&*self.conn()?, bound)
    }

    fn find_by_name(&self, name: &str) -> Result<Vec<Event>> {
        EventRepo::list_by_name(&*self.conn()?, name)
    }

    fn find_by_creator(&self, login: &str) -> Result<Vec<Event>> {
        EventRepo::list_by_creator(&*self.conn()?, login)
    }

    fn count(&self) -> Result<u64> {
        EventRepo::count(&*self.conn()?)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
