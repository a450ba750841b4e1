//! Tracing subscriber initialization: JSON lines with timestamps, filtered
//! through `EnvFilter`.

use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "info";

/// Build the filter: an explicit directive wins, then `RUST_LOG`, then
/// [`DEFAULT_FILTER`]. An unparsable directive falls back to the default.
pub fn filter(directive: Option<&str>) -> EnvFilter {
    match directive {
        Some(d) => EnvFilter::try_new(d).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    }
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init(directive: Option<&str>) {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter(directive))
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init()
        .is_ok();

    if installed {
        ::tracing::debug!("tracing subscriber installed");
    }
}
