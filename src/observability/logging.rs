//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber from configuration
//! - Define the logging collaborator injected into filters
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - Filters log through [`ExchangeLog`] rather than calling the macros
//!   directly, so tests can swap in [`MemoryLog`]
//! - `RUST_LOG` overrides the configured level

use std::sync::{Arc, Mutex, PoisonError};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Install the global subscriber. Later calls are ignored.
pub fn init_tracing(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("feed_intercept={},tower_http=info", config.log_level)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// A log event emitted while an exchange moves through a filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEntry {
    /// Low-level progress marker.
    Trace(String),
    /// Request line and flattened request headers.
    Request {
        path: String,
        method: String,
        headers: String,
    },
    /// Flattened response headers.
    Response { headers: String },
    /// A downstream failure, with full detail.
    Warning(String),
}

/// Sink for [`LogEntry`] values.
pub trait ExchangeLog: Send + Sync {
    fn record(&self, entry: LogEntry);
}

impl<T: ExchangeLog + ?Sized> ExchangeLog for Arc<T> {
    fn record(&self, entry: LogEntry) {
        (**self).record(entry)
    }
}

/// Forwards entries to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog;

impl ExchangeLog for TracingLog {
    fn record(&self, entry: LogEntry) {
        match entry {
            LogEntry::Trace(message) => tracing::trace!("{}", message),
            LogEntry::Request {
                path,
                method,
                headers,
            } => tracing::debug!(path = %path, method = %method, headers = %headers, "Request"),
            LogEntry::Response { headers } => tracing::debug!(headers = %headers, "Response"),
            LogEntry::Warning(detail) => tracing::warn!(error = %detail, "Exchange failed"),
        }
    }
}

/// Keeps entries in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemoryLog {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn responses(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter_map(|entry| match entry {
                LogEntry::Response { headers } => Some(headers),
                _ => None,
            })
            .collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter_map(|entry| match entry {
                LogEntry::Warning(detail) => Some(detail),
                _ => None,
            })
            .collect()
    }
}

impl ExchangeLog for MemoryLog {
    fn record(&self, entry: LogEntry) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }
}
