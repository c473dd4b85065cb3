//! Observability for the server process
//!
//! Only structured logging through `tracing` lives here; see [`logging`].

pub mod logging;

pub use logging::{init_logging, LoggingConfig, LoggingGuard};
