//! Telemetry helpers for structured logging of capacity decisions.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "coop_capacity=info";

/// Install a default fmt subscriber driven by `RUST_LOG`.
///
/// Callers embedding the engine usually install their own subscriber; this is a
/// no-op when one is already set.
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

/// Install a debug-level subscriber that writes through the test harness.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("coop_capacity=debug"))
        .with_test_writer()
        .try_init();
}
