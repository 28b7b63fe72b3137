//! Observability for tabula
//!
//! Structured JSON logging only: synchronous, unbuffered, one line per
//! event, deterministic field ordering. Logging is read-only and has no
//! effect on engine behavior.

mod logger;

pub use logger::{Level, Logger};
