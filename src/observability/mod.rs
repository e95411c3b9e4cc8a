//! Observability module.
//!
//! Structured logging through `tracing`, with pretty, compact or JSON output
//! selected from `[observability.logging]`.

mod tracing_init;

pub use tracing_init::*;
