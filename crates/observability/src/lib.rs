//! Tracing/logging setup shared by the catalog binaries.

/// Initialize process-wide logging with the filter from `RUST_LOG`
/// (default `info`).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(None);
}

/// Initialize process-wide logging with an explicit filter directive, such as
/// the one loaded into the catalog configuration.
pub fn init_with_filter(filter: &str) {
    tracing::init(Some(filter));
}

/// Subscriber construction (filters, JSON formatting).
pub mod tracing;
