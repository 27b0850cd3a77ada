//! Event repository, CRUD and filters for the `events` table.
//!
//! `date` is written twice: as RFC 3339 text (keeping the caller's offset) and
//! as `date_epoch_us` for range filters and ordering.

use chrono::{DateTime, SecondsFormat};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::dates::epoch_micros;
use crate::errors::Result;
use crate::types::{DateBound, Event, EventId, EventSummary, Page, SortOrder, order_by_clause};

const EVENT_COLUMNS: &str = "id, name, date, km, route, description, creator_login";

/// Event repository, stateless, every method takes `&Connection`.
pub struct EventRepo;

impl EventRepo {
    /// Insert a new row. Any id on `event` is ignored; returns the assigned id.
    pub fn insert(conn: &Connection, event: &Event) -> Result<EventId> {
        let _ = conn.execute(
            "INSERT INTO events (name, date, date_epoch_us, km, route, description, creator_login)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                event.name,
                format_date(event),
                epoch_micros(&event.date),
                event.km,
                event.route,
                event.description,
                event.creator,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Overwrite every column of row `id`. Returns `false` if it does not exist.
    pub fn replace(conn: &Connection, id: EventId, event: &Event) -> Result<bool> {
        let changed = conn.execute(
            "UPDATE events
             SET name = ?2, date = ?3, date_epoch_us = ?4, km = ?5,
                 route = ?6, description = ?7, creator_login = ?8
             WHERE id = ?1",
            params![
                id,
                event.name,
                format_date(event),
                epoch_micros(&event.date),
                event.km,
                event.route,
                event.description,
                event.creator,
            ],
        )?;
        Ok(changed > 0)
    }

    /// Get event by id.
    pub fn get_by_id(conn: &Connection, id: EventId) -> Result<Option<Event>> {
        let row = conn
            .query_row(
                &format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?1"),
                params![id],
                map_row,
            )
            .optional()?;
        Ok(row)
    }

    /// Delete event by id.
    pub fn delete(conn: &Connection, id: EventId) -> Result<bool> {
        let changed = conn.execute("DELETE FROM events WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    /// One page of events under `sort`, then `id`.
    pub fn list_page(
        conn: &Connection,
        offset: u64,
        limit: u64,
        sort: &[SortOrder],
    ) -> Result<Vec<Event>> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events {} LIMIT ?1 OFFSET ?2",
            order_by_clause(sort)
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![clamp_i64(limit), clamp_i64(offset)], map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// One page plus the table count, both read inside a single transaction.
    pub fn list_page_with_total(
        conn: &Connection,
        offset: u64,
        limit: u64,
        sort: &[SortOrder],
    ) -> Result<Page> {
        let tx = conn.unchecked_transaction()?;
        let events = Self::list_page(&tx, offset, limit, sort)?;
        let total = Self::count(&tx)?;
        tx.commit()?;
        Ok(Page { events, total })
    }

    /// Summary projection of all events under `sort`, then `id`.
    pub fn list_summaries(conn: &Connection, sort: &[SortOrder]) -> Result<Vec<EventSummary>> {
        let sql = format!(
            "SELECT name, km, route, description FROM events {}",
            order_by_clause(sort)
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(EventSummary {
                    name: row.get(0)?,
                    km: row.get(1)?,
                    route: row.get(2)?,
                    description: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Events strictly before or after an instant.
    pub fn list_by_date(conn: &Connection, bound: DateBound) -> Result<Vec<Event>> {
        let (op, threshold) = match bound {
            DateBound::Before(t) => ("<", t),
            DateBound::After(t) => (">", t),
        };
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE date_epoch_us {op} ?1 ORDER BY id ASC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![threshold.timestamp_micros()], map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Events with exactly this name.
    pub fn list_by_name(conn: &Connection, name: &str) -> Result<Vec<Event>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE name = ?1 ORDER BY id ASC"
        ))?;
        let rows = stmt
            .query_map(params![name], map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Events owned by `login`.
    pub fn list_by_creator(conn: &Connection, login: &str) -> Result<Vec<Event>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE creator_login = ?1 ORDER BY id ASC"
        ))?;
        let rows = stmt
            .query_map(params![login], map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Count all events.
    pub fn count(conn: &Connection) -> Result<u64> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

fn format_date(event: &Event) -> String {
    event.date.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

fn clamp_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<Event> {
    let date: String = row.get(2)?;
    let date = DateTime::parse_from_rfc3339(&date)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;
    Ok(Event {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        date,
        km: row.get(3)?,
        route: row.get(4)?,
        description: row.get(5)?,
        creator: row.get(6)?,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
