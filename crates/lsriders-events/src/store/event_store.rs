//! Event access operations with identity and query semantics.

use std::sync::Arc;

use lsriders_settings::EventSettings;
use tracing::{debug, instrument};

use crate::dates::{DateZone, ensure_storable, normalize_timestamp, parse_threshold};
use crate::errors::{EventStoreError, Result};
use crate::memory::InMemoryEventRepository;
use crate::repository::EventRepository;
use crate::sqlite::{ConnectionPool, SqliteEventRepository};
use crate::types::{
    DateBound, Event, EventId, EventSummary, Page, PageRequest, Principal, SortField, SortOrder,
};

/// Tunables for [`EventStore`].
#[derive(Clone, Debug)]
pub struct EventStoreConfig {
    /// Page size used when a request gives none (or zero).
    pub default_page_size: u32,
    /// Larger requested page sizes are clamped to this.
    pub max_page_size: u32,
    /// Zone used to turn `yyyy-MM-dd` thresholds into instants.
    pub zone: DateZone,
    /// Order of [`EventStore::list_ordered`].
    pub summary_order: Vec<SortOrder>,
}

impl Default for EventStoreConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 2000,
            zone: DateZone::Local,
            summary_order: vec![
                SortOrder::asc(SortField::Km),
                SortOrder::asc(SortField::Name),
                SortOrder::asc(SortField::Description),
            ],
        }
    }
}

impl EventStoreConfig {
    /// Build from the `events` settings section.
    ///
    /// An unknown time zone or sort spec is a configuration error.
    pub fn from_settings(settings: &EventSettings) -> Result<Self> {
        let summary_order = SortOrder::parse_all(&settings.summary_sort)
            .map_err(|e| EventStoreError::InvalidConfig(format!("events.summarySort: {e}")))?;
        Ok(Self {
            default_page_size: settings.default_page_size.max(1),
            max_page_size: settings.max_page_size.max(settings.default_page_size).max(1),
            zone: DateZone::parse(&settings.time_zone)?,
            summary_order,
        })
    }
}

/// Event access layer.
///
/// Every method is a single repository call; failures are returned as-is and
/// never retried.
#[derive(Clone)]
pub struct EventStore {
    repo: Arc<dyn EventRepository>,
    config: EventStoreConfig,
}

impl std::fmt::Debug for EventStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl EventStore {
    /// Create a store over any repository.
    pub fn new(repo: Arc<dyn EventRepository>, config: EventStoreConfig) -> Self {
        Self { repo, config }
    }

    /// Store over a migrated `SQLite` pool.
    pub fn sqlite(pool: ConnectionPool, config: EventStoreConfig) -> Self {
        Self::new(Arc::new(SqliteEventRepository::new(pool)), config)
    }

    /// Store over an empty in-memory repository.
    pub fn in_memory(config: EventStoreConfig) -> Self {
        Self::new(Arc::new(InMemoryEventRepository::new()), config)
    }

    /// Active configuration.
    pub fn config(&self) -> &EventStoreConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────

    /// Persist a new event and return it with its assigned id.
    ///
    /// Fails with `InvalidArgument` if the event already carries an id.
    #[instrument(skip(self, event), fields(name = %event.name))]
    pub fn create(&self, event: Event) -> Result<Event> {
        if let Some(id) = event.id {
            return Err(EventStoreError::invalid(format!(
                "a new event cannot already have an id (got {id})"
            )));
        }
        let event = sanitize(event)?;
        let stored = self.repo.insert(&event)?;
        debug!(id = ?stored.id, "event created");
        Ok(stored)
    }

    /// Replace an existing event wholesale.
    ///
    /// Fails with `InvalidArgument` if the event has no id and with `NotFound`
    /// if no record has that id; nothing is written in either case.
    #[instrument(skip(self, event), fields(id = ?event.id))]
    pub fn update(&self, event: Event) -> Result<Event> {
        let Some(id) = event.id else {
            return Err(EventStoreError::invalid("an updated event must have an id"));
        };
        let event = sanitize(event)?;
        if !self.repo.replace(id, &event)? {
            return Err(EventStoreError::NotFound(id));
        }
        debug!(id, "event updated");
        Ok(event)
    }

    /// Delete an event. Deleting an id that does not exist is not an error.
    #[instrument(skip(self))]
    pub fn delete_by_id(&self, id: EventId) -> Result<()> {
        let existed = self.repo.delete_by_id(id)?;
        debug!(id, existed, "event deleted");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────

    /// Fetch one event.
    #[instrument(skip(self))]
    pub fn get_by_id(&self, id: EventId) -> Result<Event> {
        self.repo
            .find_by_id(id)?
            .ok_or(EventStoreError::NotFound(id))
    }

    /// One page of all events, ordered by `request.sort` then id.
    #[instrument(skip(self))]
    pub fn list_all(&self, request: &PageRequest) -> Result<Vec<Event>> {
        let (offset, limit) = self.resolve_page(request)?;
        self.repo.find_page(offset, limit, &request.sort)
    }

    /// Like [`list_all`](Self::list_all), plus the total event count taken
    /// from the same read.
    #[instrument(skip(self))]
    pub fn list_all_with_total(&self, request: &PageRequest) -> Result<Page> {
        let (offset, limit) = self.resolve_page(request)?;
        self.repo.find_page_with_total(offset, limit, &request.sort)
    }

    /// Total number of stored events.
    pub fn count(&self) -> Result<u64> {
        self.repo.count()
    }

    /// Summary projection under the configured order.
    pub fn list_ordered(&self) -> Result<Vec<EventSummary>> {
        self.repo.find_summaries(&self.config.summary_order)
    }

    /// Summary projection under an explicit order.
    pub fn list_ordered_by(&self, sort: &[SortOrder]) -> Result<Vec<EventSummary>> {
        self.repo.find_summaries(sort)
    }

    /// Events strictly before the start of the given `yyyy-MM-dd` day.
    #[instrument(skip(self))]
    pub fn list_by_date_before(&self, date: &str) -> Result<Vec<Event>> {
        let threshold = parse_threshold(date, self.config.zone)?;
        self.repo.find_by_date(DateBound::Before(threshold))
    }

    /// Events strictly after the start of the given `yyyy-MM-dd` day.
    #[instrument(skip(self))]
    pub fn list_by_date_after(&self, date: &str) -> Result<Vec<Event>> {
        let threshold = parse_threshold(date, self.config.zone)?;
        self.repo.find_by_date(DateBound::After(threshold))
    }

    /// Events whose name equals `name` exactly.
    #[instrument(skip(self))]
    pub fn list_by_name(&self, name: &str) -> Result<Vec<Event>> {
        self.repo.find_by_name(name)
    }

    /// Events created by `principal`.
    #[instrument(skip(self), fields(login = %principal))]
    pub fn list_owned_by(&self, principal: &Principal) -> Result<Vec<Event>> {
        self.repo.find_by_creator(principal.login())
    }

    fn resolve_page(&self, request: &PageRequest) -> Result<(u64, u64)> {
        let page = request.page.unwrap_or(0);
        let size = request.size.unwrap_or(0);
        if page < 0 {
            return Err(EventStoreError::invalid(format!(
                "page must not be negative, got {page}"
            )));
        }
        if size < 0 {
            return Err(EventStoreError::invalid(format!(
                "size must not be negative, got {size}"
            )));
        }
        let size = match u64::try_from(size).unwrap_or(0) {
            0 => u64::from(self.config.default_page_size),
            s => s.min(u64::from(self.config.max_page_size)),
        };
        let offset = u64::try_from(page)
            .ok()
            .and_then(|p| p.checked_mul(size))
            .filter(|o| i64::try_from(*o).is_ok())
            .ok_or_else(|| EventStoreError::invalid(format!("page {page} is out of range")))?;
        Ok((offset, size))
    }
}

fn sanitize(mut event: Event) -> Result<Event> {
    if let Some(km) = event.km {
        if !km.is_finite() {
            return Err(EventStoreError::invalid(format!(
                "km must be a finite number, got {km}"
            )));
        }
    }
    ensure_storable(&event.date)?;
    event.date = normalize_timestamp(event.date);
    Ok(event)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(unused_results)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::repository::MockEventRepository;
    use crate::sqlite::connection::{self, ConnectionConfig};
    use assert_matches::assert_matches;
    use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
    use chrono_tz::Tz;
    use proptest::prelude::*;

    fn madrid() -> EventStoreConfig {
        EventStoreConfig {
            zone: DateZone::Named(Tz::Europe__Madrid),
            ..Default::default()
        }
    }

    fn setup() -> EventStore {
        EventStore::in_memory(madrid())
    }

    fn setup_sqlite() -> EventStore {
        let pool = connection::new_in_memory(&ConnectionConfig::default()).unwrap();
        let repo = SqliteEventRepository::initialize(pool).unwrap();
        EventStore::new(Arc::new(repo), madrid())
    }

    fn at(rfc3339: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap()
    }

    fn page(page: Option<i64>, size: Option<i64>) -> PageRequest {
        PageRequest {
            page,
            size,
            sort: vec![SortOrder::asc(SortField::Id)],
        }
    }

    // ── Identity rules ────────────────────────────────────────────────

    #[test]
    fn create_assigns_fresh_ids() {
        for store in [setup(), setup_sqlite()] {
            let a = store.create(Event::new("a", at("2024-01-01T00:00:00Z"))).unwrap();
            let b = store.create(Event::new("b", at("2024-01-01T00:00:00Z"))).unwrap();
            assert!(a.id.is_some());
            assert_ne!(a.id, b.id);
        }
    }

    #[test]
    fn create_with_id_is_rejected_before_storage() {
        let mut repo = MockEventRepository::new();
        repo.expect_insert().never();
        let store = EventStore::new(Arc::new(repo), EventStoreConfig::default());

        let mut event = Event::new("a", at("2024-01-01T00:00:00Z"));
        event.id = Some(5);
        let err = store.create(event).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn update_without_id_is_rejected_before_storage() {
        let mut repo = MockEventRepository::new();
        repo.expect_replace().never();
        let store = EventStore::new(Arc::new(repo), EventStoreConfig::default());

        let err = store
            .update(Event::new("a", at("2024-01-01T00:00:00Z")))
            .unwrap_err();
        assert_matches!(err, EventStoreError::InvalidArgument(_));
    }

    #[test]
    fn update_missing_id_is_not_found_and_writes_nothing() {
        for store in [setup(), setup_sqlite()] {
            let mut event = Event::new("ghost", at("2024-01-01T00:00:00Z"));
            event.id = Some(42);
            let err = store.update(event).unwrap_err();
            assert_matches!(err, EventStoreError::NotFound(42));
            assert_eq!(store.count().unwrap(), 0);
        }
    }

    #[test]
    fn update_replaces_whole_record() {
        for store in [setup(), setup_sqlite()] {
            let created = store
                .create(
                    Event::new("old", at("2024-01-01T00:00:00Z"))
                        .with_km(10.0)
                        .with_route("r"),
                )
                .unwrap();
            let replacement = Event {
                id: created.id,
                ..Event::new("new", at("2024-02-02T10:00:00+02:00"))
            };
            let updated = store.update(replacement.clone()).unwrap();
            assert_eq!(updated, replacement);

            let fetched = store.get_by_id(created.id.unwrap()).unwrap();
            assert_eq!(fetched, replacement);
            assert_eq!(fetched.route, None);
        }
    }

    #[test]
    fn non_finite_km_is_rejected() {
        let store = setup();
        for km in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = store
                .create(Event::new("a", at("2024-01-01T00:00:00Z")).with_km(km))
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        }
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn create_truncates_to_microseconds() {
        for store in [setup(), setup_sqlite()] {
            let created = store
                .create(Event::new("a", at("2024-01-01T00:00:00.123456789Z")))
                .unwrap();
            assert_eq!(created.date, at("2024-01-01T00:00:00.123456Z"));
            assert_eq!(store.get_by_id(created.id.unwrap()).unwrap(), created);
        }
    }

    #[test]
    fn out_of_range_years_are_rejected_on_both_backends() {
        for store in [setup(), setup_sqlite()] {
            let kept = store.create(Event::new("near", at("2024-01-01T00:00:00Z"))).unwrap();
            let far: Event =
                serde_json::from_str(r#"{"name":"far","date":"+10000-01-01T00:00:00Z"}"#).unwrap();
            assert_matches!(store.create(far.clone()), Err(EventStoreError::InvalidArgument(_)));
            assert_matches!(
                store.update(Event { id: kept.id, ..far }),
                Err(EventStoreError::InvalidArgument(_))
            );

            assert_eq!(store.get_by_id(kept.id.unwrap()).unwrap(), kept);
            assert_eq!(store.list_all(&page(None, None)).unwrap(), vec![kept.clone()]);
            assert_eq!(store.list_by_date_after("2000-01-01").unwrap(), vec![kept]);
        }
    }

    #[test]
    fn delete_is_idempotent() {
        for store in [setup(), setup_sqlite()] {
            let created = store.create(Event::new("a", at("2024-01-01T00:00:00Z"))).unwrap();
            let id = created.id.unwrap();
            store.delete_by_id(id).unwrap();
            store.delete_by_id(id).unwrap();
            store.delete_by_id(9999).unwrap();
            assert_matches!(store.get_by_id(id), Err(EventStoreError::NotFound(_)));
        }
    }

    // ── Paging ────────────────────────────────────────────────────────

    #[test]
    fn list_all_pages_and_defaults() {
        let store = setup();
        for i in 0..25 {
            store
                .create(Event::new(format!("e{i:02}"), at("2024-01-01T00:00:00Z")))
                .unwrap();
        }
        assert_eq!(store.list_all(&page(None, None)).unwrap().len(), 20);
        assert_eq!(store.list_all(&page(Some(0), Some(0))).unwrap().len(), 20);
        let second = store.list_all(&page(Some(1), None)).unwrap();
        assert_eq!(second.len(), 5);
        assert_eq!(second[0].name, "e20");
        assert!(store.list_all(&page(Some(9), Some(10))).unwrap().is_empty());
    }

    #[test]
    fn list_all_with_total_matches_separate_reads() {
        for store in [setup(), setup_sqlite()] {
            for i in 0..7 {
                store
                    .create(Event::new(format!("e{i}"), at("2024-01-01T00:00:00Z")))
                    .unwrap();
            }
            let request = page(Some(1), Some(3));
            let page = store.list_all_with_total(&request).unwrap();
            assert_eq!(page.events, store.list_all(&request).unwrap());
            assert_eq!(page.total, 7);
        }
    }

    #[test]
    fn list_all_with_total_is_one_repository_read() {
        let mut repo = MockEventRepository::new();
        repo.expect_find_page().never();
        repo.expect_count().never();
        repo.expect_find_page_with_total()
            .withf(|offset, limit, _| *offset == 40 && *limit == 20)
            .times(1)
            .returning(|_, _, _| {
                Ok(Page {
                    events: Vec::new(),
                    total: 12,
                })
            });
        let store = EventStore::new(Arc::new(repo), EventStoreConfig::default());

        let page = store.list_all_with_total(&page(Some(2), None)).unwrap();
        assert!(page.events.is_empty());
        assert_eq!(page.total, 12);
    }

    #[test]
    fn list_all_clamps_large_size() {
        let store = EventStore::in_memory(EventStoreConfig {
            max_page_size: 3,
            ..Default::default()
        });
        for i in 0..5 {
            store
                .create(Event::new(format!("e{i}"), at("2024-01-01T00:00:00Z")))
                .unwrap();
        }
        assert_eq!(store.list_all(&page(Some(0), Some(1000))).unwrap().len(), 3);
    }

    #[test]
    fn list_all_rejects_negative_and_overflowing_pages() {
        let store = setup();
        for request in [
            page(Some(-1), None),
            page(None, Some(-5)),
            page(Some(i64::MAX), Some(20)),
        ] {
            let err = store.list_all(&request).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument, "{request:?}");
        }
    }

    #[test]
    fn list_all_is_deterministic_with_ties() {
        for store in [setup(), setup_sqlite()] {
            for name in ["x", "x", "x", "y"] {
                store.create(Event::new(name, at("2024-01-01T00:00:00Z"))).unwrap();
            }
            let request = PageRequest {
                page: Some(0),
                size: Some(10),
                sort: vec![SortOrder::asc(SortField::Name)],
            };
            let first = store.list_all(&request).unwrap();
            let ids: Vec<_> = first.iter().map(|e| e.id.unwrap()).collect();
            assert_eq!(ids, vec![1, 2, 3, 4]);
            assert_eq!(store.list_all(&request).unwrap(), first);
        }
    }

    // ── Ordered summaries ─────────────────────────────────────────────

    #[test]
    fn list_ordered_uses_configured_order() {
        for store in [setup(), setup_sqlite()] {
            store
                .create(Event::new("b", at("2024-01-01T00:00:00Z")).with_km(10.0))
                .unwrap();
            store
                .create(Event::new("a", at("2024-01-01T00:00:00Z")).with_km(10.0))
                .unwrap();
            store
                .create(Event::new("c", at("2024-01-01T00:00:00Z")).with_km(5.0))
                .unwrap();
            let names: Vec<_> = store
                .list_ordered()
                .unwrap()
                .into_iter()
                .map(|s| s.name)
                .collect();
            assert_eq!(names, vec!["c", "a", "b"]);

            let by_name_desc: Vec<_> = store
                .list_ordered_by(&[SortOrder::desc(SortField::Name)])
                .unwrap()
                .into_iter()
                .map(|s| s.name)
                .collect();
            assert_eq!(by_name_desc, vec!["c", "b", "a"]);
        }
    }

    // ── Date filters ──────────────────────────────────────────────────

    #[test]
    fn coastal_10k_scenario() {
        for store in [setup(), setup_sqlite()] {
            let created = store
                .create(Event::new("Coastal 10K", at("2024-05-01T09:00:00+02:00")))
                .unwrap();
            let id = created.id.unwrap();
            assert_eq!(store.get_by_id(id).unwrap(), created);

            let after = store.list_by_date_after("2024-04-30").unwrap();
            assert!(after.iter().any(|e| e.id == Some(id)));
            let before = store.list_by_date_before("2024-04-30").unwrap();
            assert!(before.iter().all(|e| e.id != Some(id)));

            store.delete_by_id(id).unwrap();
            assert_matches!(store.get_by_id(id), Err(EventStoreError::NotFound(n)) if n == id);
        }
    }

    #[test]
    fn date_threshold_uses_configured_zone() {
        let store = setup();
        // Madrid midnight on 2024-06-10 is 2024-06-09T22:00Z.
        store.create(Event::new("late", at("2024-06-09T22:30:00Z"))).unwrap();
        let after = store.list_by_date_after("2024-06-10").unwrap();
        assert_eq!(after.len(), 1);
        assert!(store.list_by_date_before("2024-06-10").unwrap().is_empty());
    }

    #[test]
    fn event_exactly_at_start_of_day_is_in_neither_list() {
        let store = setup();
        store.create(Event::new("edge", at("2024-06-10T00:00:00+02:00"))).unwrap();
        assert!(store.list_by_date_before("2024-06-10").unwrap().is_empty());
        assert!(store.list_by_date_after("2024-06-10").unwrap().is_empty());
    }

    #[test]
    fn malformed_date_is_invalid_argument() {
        let mut repo = MockEventRepository::new();
        repo.expect_find_by_date().never();
        let store = EventStore::new(Arc::new(repo), EventStoreConfig::default());
        for input in ["", "2024/05/01", "01-05-2024", "2024-13-01", "yesterday"] {
            assert_matches!(
                store.list_by_date_before(input),
                Err(EventStoreError::InvalidArgument(_))
            );
            assert_matches!(
                store.list_by_date_after(input),
                Err(EventStoreError::InvalidArgument(_))
            );
        }
    }

    // ── Name and owner filters ────────────────────────────────────────

    #[test]
    fn list_by_name_returns_exact_subset() {
        for store in [setup(), setup_sqlite()] {
            for name in ["Route-A", "Route-B", "route-a", "Route-A"] {
                store.create(Event::new(name, at("2024-01-01T00:00:00Z"))).unwrap();
            }
            let rows = store.list_by_name("Route-A").unwrap();
            assert_eq!(rows.len(), 2);
            assert!(rows.iter().all(|e| e.name == "Route-A"));
            assert!(store.list_by_name("Route-C").unwrap().is_empty());
        }
    }

    #[test]
    fn list_owned_by_principal() {
        for store in [setup(), setup_sqlite()] {
            store
                .create(Event::new("mine", at("2024-01-01T00:00:00Z")).with_creator("alice"))
                .unwrap();
            store
                .create(Event::new("theirs", at("2024-01-01T00:00:00Z")).with_creator("bob"))
                .unwrap();
            let rows = store.list_owned_by(&Principal::new("alice")).unwrap();
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].name, "mine");
            assert!(store.list_owned_by(&Principal::new("carol")).unwrap().is_empty());
        }
    }

    // ── Storage failures ──────────────────────────────────────────────

    #[test]
    fn storage_failures_are_propagated() {
        let mut repo = MockEventRepository::new();
        repo.expect_find_by_id()
            .returning(|_| Err(EventStoreError::Internal("disk on fire".into())));
        repo.expect_insert()
            .times(1)
            .returning(|_| Err(EventStoreError::Sqlite(rusqlite::Error::InvalidQuery)));
        let store = EventStore::new(Arc::new(repo), EventStoreConfig::default());

        let err = store.get_by_id(1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StorageFailure);
        let err = store
            .create(Event::new("a", at("2024-01-01T00:00:00Z")))
            .unwrap_err();
        assert_matches!(err, EventStoreError::Sqlite(_));
    }

    #[test]
    fn config_from_settings() {
        let settings = EventSettings {
            time_zone: "America/Santiago".into(),
            summary_sort: vec!["date,desc".into()],
            ..Default::default()
        };
        let config = EventStoreConfig::from_settings(&settings).unwrap();
        assert_eq!(config.zone, DateZone::Named(Tz::America__Santiago));
        assert_eq!(config.summary_order, vec![SortOrder::desc(SortField::Date)]);

        let bad_zone = EventSettings {
            time_zone: "Mars/Olympus".into(),
            ..Default::default()
        };
        assert_matches!(
            EventStoreConfig::from_settings(&bad_zone),
            Err(EventStoreError::InvalidConfig(_))
        );
        let bad_sort = EventSettings {
            summary_sort: vec!["speed,asc".into()],
            ..Default::default()
        };
        assert_matches!(
            EventStoreConfig::from_settings(&bad_sort),
            Err(EventStoreError::InvalidConfig(_))
        );
    }

    // ── Properties ────────────────────────────────────────────────────

    fn offset_strategy() -> impl Strategy<Value = FixedOffset> {
        (-12i32..=14).prop_map(|h| FixedOffset::east_opt(h * 3600).unwrap())
    }

    fn date_strategy() -> impl Strategy<Value = DateTime<FixedOffset>> {
        // Around 2024-03-31 (Madrid spring-forward), at minute resolution.
        (0i64..(6 * 24 * 60), offset_strategy()).prop_map(|(minutes, offset)| {
            let base = Utc.with_ymd_and_hms(2024, 3, 28, 0, 0, 0).unwrap();
            (base + Duration::minutes(minutes)).with_timezone(&offset)
        })
    }

    fn event_strategy() -> impl Strategy<Value = Event> {
        (
            prop::sample::select(vec!["Route-A", "Route-B", "Loop"]),
            date_strategy(),
            prop::option::of(prop::sample::select(vec![5.0, 10.0, 21.1, 42.2])),
            prop::option::of(prop::sample::select(vec!["a", "b"])),
        )
            .prop_map(|(name, date, km, description)| Event {
                km,
                description: description.map(String::from),
                ..Event::new(name, date)
            })
    }

    fn sort_strategy() -> impl Strategy<Value = Vec<SortOrder>> {
        let field = prop::sample::select(vec![
            SortField::Name,
            SortField::Date,
            SortField::Km,
            SortField::Description,
        ]);
        prop::collection::vec(
            (field, any::<bool>()).prop_map(|(f, asc)| {
                if asc {
                    SortOrder::asc(f)
                } else {
                    SortOrder::desc(f)
                }
            }),
            0..3,
        )
    }

    proptest! {
        #[test]
        fn date_filters_partition_events(
            events in prop::collection::vec(event_strategy(), 0..30),
            day in 28u32..=31,
        ) {
            let store = setup();
            for event in &events {
                store.create(event.clone()).unwrap();
            }
            let threshold = format!("2024-03-{day:02}");
            let start = madrid().zone.start_of_day(
                chrono::NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            );

            let before = store.list_by_date_before(&threshold).unwrap();
            let after = store.list_by_date_after(&threshold).unwrap();
            let at_start = events.iter().filter(|e| e.date == start).count();

            prop_assert!(before.iter().all(|e| e.date < start));
            prop_assert!(after.iter().all(|e| e.date > start));
            prop_assert!(before.iter().all(|b| after.iter().all(|a| a.id != b.id)));
            prop_assert_eq!(before.len() + after.len() + at_start, events.len());
        }

        #[test]
        fn repositories_agree_on_ordering(
            events in prop::collection::vec(event_strategy(), 0..20),
            sort in sort_strategy(),
        ) {
            let memory = setup();
            let sqlite = setup_sqlite();
            for event in &events {
                memory.create(event.clone()).unwrap();
                sqlite.create(event.clone()).unwrap();
            }
            let request = PageRequest { page: Some(0), size: Some(50), sort: sort.clone() };
            let from_memory: Vec<_> =
                memory.list_all(&request).unwrap().into_iter().map(|e| e.id).collect();
            let from_sqlite: Vec<_> =
                sqlite.list_all(&request).unwrap().into_iter().map(|e| e.id).collect();
            prop_assert_eq!(from_memory, from_sqlite);
            prop_assert_eq!(memory.list_ordered_by(&sort).unwrap(), sqlite.list_ordered_by(&sort).unwrap());
        }
    }
}
