//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Filters, handlers, archiver produce:
//!     → logging.rs (structured log events, ExchangeLog collaborator)
//!     → metrics.rs (counters, histograms)
//!     → tracing.rs (one span per exchange, keyed by request ID)
//!
//! Consumers:
//!     → stdout (tracing-subscriber fmt layer)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through all events of an exchange via its span
//! - Metrics are cheap (atomic increments) and off unless configured

pub mod logging;
pub mod metrics;
pub mod tracing;

pub use logging::{init_tracing, ExchangeLog, LogEntry, MemoryLog, TracingLog};
