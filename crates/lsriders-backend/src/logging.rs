//! Tracing subscriber setup.

use lsriders_settings::{LogFormat, LoggingSettings};
use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber on stderr.
///
/// `RUST_LOG` wins over the configured level. Subsequent calls are no-ops.
pub fn init_subscriber(settings: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    // set_global_default is a no-op if already set
    let _ = match settings.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
