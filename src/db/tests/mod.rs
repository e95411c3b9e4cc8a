//! Repository tests against in-memory SQLite with the real migrations.

mod harness;

pub use harness::*;
