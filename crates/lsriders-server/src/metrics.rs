//! Prometheus metrics recorder and metric names.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::info;

/// Install the Prometheus metrics recorder (global).
///
/// Returns the `PrometheusHandle` used to render the `/metrics` endpoint.
/// Call once at startup before any metrics are recorded.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    info!("prometheus metrics recorder installed");
    Ok(handle)
}

/// Render Prometheus text format, or nothing when no recorder is installed.
pub fn render(handle: Option<&PrometheusHandle>) -> String {
    handle.map(PrometheusHandle::render).unwrap_or_default()
}

/// Requests handled (counter, labels: operation).
pub const EVENT_REQUESTS_TOTAL: &str = "event_requests_total";
/// Failed requests (counter, labels: operation, kind).
pub const EVENT_REQUEST_ERRORS_TOTAL: &str = "event_request_errors_total";
/// Request duration seconds (histogram, labels: operation).
pub const EVENT_REQUEST_DURATION_SECONDS: &str = "event_request_duration_seconds";
