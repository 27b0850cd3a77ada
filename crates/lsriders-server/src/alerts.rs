//! Alert headers attached to mutation responses.
//!
//! Clients read `X-lsridersApp-alert` as a translation key and
//! `X-lsridersApp-params` as its argument.

use axum::http::{HeaderMap, HeaderName, HeaderValue};

/// Application name used as the header and key prefix.
pub const APPLICATION_NAME: &str = "lsridersApp";

/// Entity name for the event resource.
pub const ENTITY_NAME: &str = "event";

/// Success alert header.
pub static ALERT_HEADER: HeaderName = HeaderName::from_static("x-lsridersapp-alert");
/// Failure alert header.
pub static ERROR_HEADER: HeaderName = HeaderName::from_static("x-lsridersapp-error");
/// Alert parameter header.
pub static PARAMS_HEADER: HeaderName = HeaderName::from_static("x-lsridersapp-params");

/// Headers for a generic alert with one parameter.
pub fn alert(message: &str, param: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    insert(&mut headers, &ALERT_HEADER, message);
    insert(&mut headers, &PARAMS_HEADER, param);
    headers
}

/// `lsridersApp.event.created`
pub fn entity_created(id: &str) -> HeaderMap {
    alert(&format!("{APPLICATION_NAME}.{ENTITY_NAME}.created"), id)
}

/// `lsridersApp.event.updated`
pub fn entity_updated(id: &str) -> HeaderMap {
    alert(&format!("{APPLICATION_NAME}.{ENTITY_NAME}.updated"), id)
}

/// `lsridersApp.event.deleted`
pub fn entity_deleted(id: &str) -> HeaderMap {
    alert(&format!("{APPLICATION_NAME}.{ENTITY_NAME}.deleted"), id)
}

/// Failure alert: `error.{key}` with the entity name as parameter.
pub fn failure(key: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    insert(&mut headers, &ERROR_HEADER, &format!("error.{key}"));
    insert(&mut headers, &PARAMS_HEADER, ENTITY_NAME);
    headers
}

// Non-visible ASCII in a value (e.g. an odd id) drops the header rather than
// failing the response.
fn insert(headers: &mut HeaderMap, name: &HeaderName, value: &str) {
    if let Ok(value) = HeaderValue::from_str(value) {
        let _ = headers.insert(name.clone(), value);
    }
}
