//! `/api/events` route handlers.
//!
//! Every handler hands one [`EventStore`] call to a blocking worker via
//! [`run_store`], which also records the request metrics.

use std::time::Instant;

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum_extra::extract::WithRejection;
use lsriders_events::{
    Event, EventId, EventStore, EventSummary, PageRequest, Principal, SortOrder,
};
use metrics::{counter, histogram};
use serde::Deserialize;
use tracing::debug;

use crate::alerts;
use crate::errors::{ApiError, KEY_ID_EXISTS, KEY_ID_NULL, KEY_INVALID};
use crate::metrics::{
    EVENT_REQUEST_DURATION_SECONDS, EVENT_REQUEST_ERRORS_TOTAL, EVENT_REQUESTS_TOTAL,
};
use crate::server::AppState;

/// Total-count header on the paged listing.
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// Event routes, to be merged into the main router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/events", get(list_events).post(create_event).put(update_event))
        .route("/api/events-dto", get(list_event_summaries))
        .route("/api/events/dateAfter/", get(list_events_after))
        .route("/api/events/dateAfter", get(list_events_after))
        .route("/api/events/dateBefore/", get(list_events_before))
        .route("/api/events/dateBefore", get(list_events_before))
        .route("/api/events/by-Name/{name}", get(list_events_by_name))
        .route("/api/events/mine", get(list_my_events))
        .route("/api/events/{id}", get(get_event).delete(delete_event))
}

/// Query of `GET /api/events`.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    /// Zero-based page index.
    pub page: Option<i64>,
    /// Page size.
    pub size: Option<i64>,
    /// Repeatable `field[,asc|desc]`.
    #[serde(default)]
    pub sort: Vec<String>,
}

/// Query of the date filters.
#[derive(Debug, Deserialize)]
pub struct DateParams {
    /// Threshold day, `yyyy-MM-dd`.
    #[serde(rename = "dateString")]
    pub date_string: Option<String>,
}

/// Run one store call on the blocking pool and record its metrics.
async fn run_store<T, F>(state: &AppState, operation: &'static str, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&EventStore) -> Result<T, ApiError> + Send + 'static,
{
    let started = Instant::now();
    counter!(EVENT_REQUESTS_TOTAL, "operation" => operation).increment(1);

    let store = state.store.clone();
    let result = tokio::task::spawn_blocking(move || f(&store))
        .await
        .unwrap_or_else(|e| {
            Err(ApiError::Internal {
                message: format!("store task failed: {e}"),
            })
        });

    histogram!(EVENT_REQUEST_DURATION_SECONDS, "operation" => operation)
        .record(started.elapsed().as_secs_f64());
    if let Err(err) = &result {
        counter!(
            EVENT_REQUEST_ERRORS_TOTAL,
            "operation" => operation,
            "kind" => err.kind_label()
        )
        .increment(1);
    }
    result
}

fn principal_from(headers: &HeaderMap, state: &AppState) -> Option<Principal> {
    headers
        .get(&state.principal_header)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|login| !login.is_empty())
        .map(Principal::new)
}

/// POST /api/events
async fn create_event(
    State(state): State<AppState>,
    WithRejection(Json(event), _): WithRejection<Json<Event>, ApiError>,
) -> Result<Response, ApiError> {
    debug!(name = %event.name, "request to save event");
    let created = run_store(&state, "create", move |store| {
        if event.id.is_some() {
            return Err(ApiError::bad_request(
                KEY_ID_EXISTS,
                "A new event cannot already have an ID",
            ));
        }
        Ok(store.create(event)?)
    })
    .await?;

    let id = created.id.map(|id| id.to_string()).unwrap_or_default();
    let mut headers = alerts::entity_created(&id);
    if let Ok(location) = HeaderValue::from_str(&format!("/api/events/{id}")) {
        let _ = headers.insert(header::LOCATION, location);
    }
    Ok((StatusCode::CREATED, headers, Json(created)).into_response())
}

/// PUT /api/events
async fn update_event(
    State(state): State<AppState>,
    WithRejection(Json(event), _): WithRejection<Json<Event>, ApiError>,
) -> Result<Response, ApiError> {
    debug!(id = ?event.id, "request to update event");
    let updated = run_store(&state, "update", move |store| {
        if event.id.is_none() {
            return Err(ApiError::bad_request(KEY_ID_NULL, "Invalid id"));
        }
        Ok(store.update(event)?)
    })
    .await?;

    let id = updated.id.map(|id| id.to_string()).unwrap_or_default();
    Ok((alerts::entity_updated(&id), Json(updated)).into_response())
}

/// GET /api/events
async fn list_events(
    State(state): State<AppState>,
    WithRejection(axum_extra::extract::Query(params), _): WithRejection<
        axum_extra::extract::Query<ListParams>,
        ApiError,
    >,
) -> Result<Response, ApiError> {
    let page = run_store(&state, "list_all", move |store| {
        let sort = SortOrder::parse_all(&params.sort)?;
        let request = PageRequest {
            page: params.page,
            size: params.size,
            sort,
        };
        Ok(store.list_all_with_total(&request)?)
    })
    .await?;

    let mut headers = HeaderMap::new();
    let _ = headers.insert(TOTAL_COUNT_HEADER, HeaderValue::from(page.total));
    Ok((headers, Json(page.events)).into_response())
}

/// GET /api/events-dto
async fn list_event_summaries(
    State(state): State<AppState>,
) -> Result<Json<Vec<EventSummary>>, ApiError> {
    let summaries = run_store(&state, "list_ordered", |store| Ok(store.list_ordered()?)).await?;
    Ok(Json(summaries))
}

fn require_date(params: DateParams) -> Result<String, ApiError> {
    params.date_string.ok_or_else(|| {
        ApiError::bad_request(KEY_INVALID, "missing required query parameter: dateString")
    })
}

/// GET /api/events/dateAfter/?dateString=yyyy-MM-dd
async fn list_events_after(
    State(state): State<AppState>,
    WithRejection(Query(params), _): WithRejection<Query<DateParams>, ApiError>,
) -> Result<Json<Vec<Event>>, ApiError> {
    let events = run_store(&state, "list_by_date_after", move |store| {
        let date = require_date(params)?;
        Ok(store.list_by_date_after(&date)?)
    })
    .await?;
    Ok(Json(events))
}

/// GET /api/events/dateBefore/?dateString=yyyy-MM-dd
async fn list_events_before(
    State(state): State<AppState>,
    WithRejection(Query(params), _): WithRejection<Query<DateParams>, ApiError>,
) -> Result<Json<Vec<Event>>, ApiError> {
    let events = run_store(&state, "list_by_date_before", move |store| {
        let date = require_date(params)?;
        Ok(store.list_by_date_before(&date)?)
    })
    .await?;
    Ok(Json(events))
}

/// GET /api/events/by-Name/{name}
async fn list_events_by_name(
    State(state): State<AppState>,
    WithRejection(Path(name), _): WithRejection<Path<String>, ApiError>,
) -> Result<Json<Vec<Event>>, ApiError> {
    let events = run_store(&state, "list_by_name", move |store| {
        Ok(store.list_by_name(&name)?)
    })
    .await?;
    Ok(Json(events))
}

/// GET /api/events/mine
async fn list_my_events(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Event>>, ApiError> {
    let principal = principal_from(&headers, &state);
    let header_name = state.principal_header.clone();
    let events = run_store(&state, "list_owned_by", move |store| {
        let principal = principal.ok_or_else(|| ApiError::Unauthorized {
            message: format!("no authenticated principal ({header_name} header missing)"),
        })?;
        Ok(store.list_owned_by(&principal)?)
    })
    .await?;
    Ok(Json(events))
}

/// GET /api/events/{id}
async fn get_event(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<EventId>, ApiError>,
) -> Result<Json<Event>, ApiError> {
    debug!(id, "request to get event");
    let event = run_store(&state, "get_by_id", move |store| Ok(store.get_by_id(id)?)).await?;
    Ok(Json(event))
}

/// DELETE /api/events/{id}
async fn delete_event(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<EventId>, ApiError>,
) -> Result<Response, ApiError> {
    debug!(id, "request to delete event");
    run_store(&state, "delete_by_id", move |store| Ok(store.delete_by_id(id)?)).await?;
    Ok((StatusCode::OK, alerts::entity_deleted(&id.to_string())).into_response())
}
