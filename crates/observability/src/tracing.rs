//! Tracing/logging initialization.
//!
//! The engine itself only emits `tracing` events; installing a subscriber is
//! the embedding process's choice, and these helpers are idempotent so tests
//! and binaries can call them freely.

use tracing_subscriber::EnvFilter;

/// Initialize process-wide logging from `RUST_LOG` (defaults to `info`).
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    install(filter);
}

/// Initialize with an explicit filter directive, e.g. `"orderflow=debug"`.
pub fn init_with_filter(directives: &str) {
    install(EnvFilter::new(directives));
}

fn install(filter: EnvFilter) {
    // JSON logs with timestamps; ignore the error if a subscriber is already
    // installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}
