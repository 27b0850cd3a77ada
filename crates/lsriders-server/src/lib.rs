//! # lsriders-server
//!
//! Axum REST surface for the event resource.
//!
//! - `/api/events` routes backed by [`lsriders_events::EventStore`]
//! - Error → status mapping with alert headers
//! - `/health` and Prometheus `/metrics` endpoints
//! - Graceful shutdown via `tokio::signal` + `CancellationToken`

#![deny(unsafe_code)]

pub mod alerts;
pub mod errors;
pub mod handlers;
pub mod health;
pub mod metrics;
pub mod server;
pub mod shutdown;

pub use errors::ApiError;
pub use server::{AppState, EventServer, ServerOptions};
pub use shutdown::ShutdownCoordinator;
