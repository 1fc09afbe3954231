//! Tracing/logging setup shared by anything that embeds the engine.

pub mod tracing;

pub use tracing::{init, init_with_filter};
