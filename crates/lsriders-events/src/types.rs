//! Event data model, query parameters, and sort orders.
//!
//! [`Event`] is the persisted route/ride record. Everything except `name`,
//! `date` and `creator` is opaque payload that is stored and returned as-is.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{EventStoreError, Result};

/// Store-assigned event identity.
pub type EventId = i64;

/// A persisted (or about to be persisted) route/ride event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Identity; `None` until the store assigns one on create.
    pub id: Option<EventId>,
    /// Display name, queryable by exact match.
    pub name: String,
    /// When the event takes place.
    pub date: DateTime<FixedOffset>,
    /// Route distance in kilometres.
    pub km: Option<f64>,
    /// Route description or link.
    pub route: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
    /// Login of the owning principal.
    pub creator: Option<String>,
}

impl Event {
    /// Build an unsaved event with only the required fields set.
    pub fn new(name: impl Into<String>, date: DateTime<FixedOffset>) -> Self {
        Self {
            id: None,
            name: name.into(),
            date,
            km: None,
            route: None,
            description: None,
            creator: None,
        }
    }

    /// Set the distance.
    #[must_use]
    pub fn with_km(mut self, km: f64) -> Self {
        self.km = Some(km);
        self
    }

    /// Set the route.
    #[must_use]
    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.route = Some(route.into());
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the owning principal's login.
    #[must_use]
    pub fn with_creator(mut self, login: impl Into<String>) -> Self {
        self.creator = Some(login.into());
        self
    }
}

/// Reduced projection returned by the ordered listing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    /// Event name.
    pub name: String,
    /// Route distance in kilometres.
    pub km: Option<f64>,
    /// Route description or link.
    pub route: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
}

impl From<&Event> for EventSummary {
    fn from(event: &Event) -> Self {
        Self {
            name: event.name.clone(),
            km: event.km,
            route: event.route.clone(),
            description: event.description.clone(),
        }
    }
}

/// The authenticated identity issuing a request.
///
/// Resolved by the caller (e.g. an authentication gateway); the access layer
/// only compares it against `Event::creator`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Principal(String);

impl Principal {
    /// Wrap a login.
    pub fn new(login: impl Into<String>) -> Self {
        Self(login.into())
    }

    /// The principal's login.
    pub fn login(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Open-ended date comparison against an instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DateBound {
    /// Strictly before the instant.
    Before(DateTime<Utc>),
    /// Strictly after the instant.
    After(DateTime<Utc>),
}

impl DateBound {
    /// Whether `date` falls on the selected side of the bound.
    pub fn matches(&self, date: &DateTime<FixedOffset>) -> bool {
        match self {
            Self::Before(threshold) => date < threshold,
            Self::After(threshold) => date > threshold,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sorting
// ─────────────────────────────────────────────────────────────────────────────

/// Sortable event fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortField {
    /// Event id.
    Id,
    /// Event name.
    Name,
    /// Event date (compared as an instant).
    Date,
    /// Distance.
    Km,
    /// Route.
    Route,
    /// Description.
    Description,
    /// Creator login.
    Creator,
}

impl SortField {
    /// Parse a field name as used in `sort=` query parameters.
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "id" => Ok(Self::Id),
            "name" => Ok(Self::Name),
            "date" => Ok(Self::Date),
            "km" => Ok(Self::Km),
            "route" => Ok(Self::Route),
            "description" => Ok(Self::Description),
            "creator" => Ok(Self::Creator),
            other => Err(EventStoreError::invalid(format!(
                "unknown sort field: {other}"
            ))),
        }
    }

    /// Field name as accepted by [`SortField::parse`].
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Date => "date",
            Self::Km => "km",
            Self::Route => "route",
            Self::Description => "description",
            Self::Creator => "creator",
        }
    }

    /// Backing `events` column.
    pub fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Date => "date_epoch_us",
            Self::Km => "km",
            Self::Route => "route",
            Self::Description => "description",
            Self::Creator => "creator_login",
        }
    }

    /// Ascending comparison of two events on this field.
    ///
    /// Absent values sort before present ones, matching `SQLite`'s `NULL`
    /// ordering.
    pub fn compare(self, a: &Event, b: &Event) -> Ordering {
        match self {
            Self::Id => a.id.cmp(&b.id),
            Self::Name => a.name.cmp(&b.name),
            Self::Date => a.date.cmp(&b.date),
            Self::Km => match (a.km, b.km) {
                (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
                (x, y) => x.is_some().cmp(&y.is_some()),
            },
            Self::Route => a.route.cmp(&b.route),
            Self::Description => a.description.cmp(&b.description),
            Self::Creator => a.creator.cmp(&b.creator),
        }
    }
}

/// Sort direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortDirection {
    /// Smallest first.
    #[default]
    Asc,
    /// Largest first.
    Desc,
}

impl SortDirection {
    fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// One `(field, direction)` sort key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SortOrder {
    /// Field to sort on.
    pub field: SortField,
    /// Direction.
    pub direction: SortDirection,
}

impl SortOrder {
    /// Ascending order on `field`.
    pub fn asc(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Asc,
        }
    }

    /// Descending order on `field`.
    pub fn desc(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Desc,
        }
    }

    /// Parse `"field"` or `"field,asc|desc"` (direction case-insensitive).
    pub fn parse(spec: &str) -> Result<Self> {
        let mut parts = spec.split(',').map(str::trim);
        let field = SortField::parse(parts.next().unwrap_or_default())?;
        let direction = match parts.next().map(str::to_ascii_lowercase).as_deref() {
            None | Some("asc") => SortDirection::Asc,
            Some("desc") => SortDirection::Desc,
            Some(other) => {
                return Err(EventStoreError::invalid(format!(
                    "unknown sort direction: {other}"
                )));
            }
        };
        if parts.next().is_some() {
            return Err(EventStoreError::invalid(format!(
                "malformed sort order: {spec}"
            )));
        }
        Ok(Self { field, direction })
    }

    /// Parse a list of sort specs, failing on the first bad one.
    pub fn parse_all<S: AsRef<str>>(specs: &[S]) -> Result<Vec<Self>> {
        specs.iter().map(|s| Self::parse(s.as_ref())).collect()
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dir = match self.direction {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        };
        write!(f, "{},{dir}", self.field.as_str())
    }
}

/// Compare two events under `orders`, breaking ties by id.
pub fn compare_events(a: &Event, b: &Event, orders: &[SortOrder]) -> Ordering {
    for order in orders {
        let ord = order.field.compare(a, b);
        let ord = match order.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.id.cmp(&b.id)
}

/// Render `orders` as an `ORDER BY` clause ending in the `id` tie-breaker.
///
/// Only whitelisted column names from [`SortField::column`] are emitted.
pub fn order_by_clause(orders: &[SortOrder]) -> String {
    let mut keys: Vec<String> = orders
        .iter()
        .map(|o| format!("{} {}", o.field.column(), o.direction.as_sql()))
        .collect();
    keys.push("id ASC".to_string());
    format!("ORDER BY {}", keys.join(", "))
}

/// Page request for the paged listing.
///
/// `page` and `size` are signed so that negative values coming off the wire
/// reach validation instead of failing to parse.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageRequest {
    /// Zero-based page index; `None` means the first page.
    pub page: Option<i64>,
    /// Page size; `None` or `0` means the configured default.
    pub size: Option<i64>,
    /// Sort orders, applied before the id tie-breaker.
    pub sort: Vec<SortOrder>,
}

/// One page of events together with the total they were sliced from.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page {
    /// Events on this page.
    pub events: Vec<Event>,
    /// Number of stored events when the page was read.
    pub total: u64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
