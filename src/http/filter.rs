//! Filter chain around handler invocation.
//!
//! # Data Flow
//! ```text
//! FilterChain::handle(exchange)
//!     → filter[0].process(exchange, next)
//!         → next.run(exchange) → filter[1].process(...)
//!             → ... → handler.handle(exchange)
//!         ← result (or unwinding panic) returns up the chain unchanged
//! ```
//!
//! # Design Decisions
//! - `Next` is consumed by `run`, so a filter can invoke the remainder of the
//!   chain at most once; dropping it short-circuits
//! - The chain is built once and shared read-only between exchanges
//! - Failures are never wrapped: what the handler raises is what the engine sees

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::http::exchange::{Exchange, ExchangeError};
use crate::observability::logging::{ExchangeLog, LogEntry};

/// A pipeline stage wrapping the rest of the chain.
pub trait Filter: Send + Sync {
    /// Human-readable description for diagnostics.
    fn description(&self) -> &'static str;

    fn process(&self, exchange: &mut Exchange, next: Next<'_>) -> Result<(), ExchangeError>;
}

/// Terminal stage of a chain.
pub trait Handler: Send + Sync {
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn handle(&self, exchange: &mut Exchange) -> Result<(), ExchangeError>;
}

impl<F> Handler for F
where
    F: Fn(&mut Exchange) -> Result<(), ExchangeError> + Send + Sync,
{
    fn handle(&self, exchange: &mut Exchange) -> Result<(), ExchangeError> {
        self(exchange)
    }
}

/// The remainder of the chain, as seen by one filter.
pub struct Next<'a> {
    filters: &'a [Box<dyn Filter>],
    handler: &'a dyn Handler,
}

impl<'a> Next<'a> {
    /// Name of the handler that terminates this chain.
    pub fn handler_name(&self) -> &str {
        self.handler.name()
    }

    /// Invoke the next filter, or the handler if no filters remain.
    pub fn run(self, exchange: &mut Exchange) -> Result<(), ExchangeError> {
        match self.filters.split_first() {
            Some((filter, rest)) => filter.process(
                exchange,
                Next {
                    filters: rest,
                    handler: self.handler,
                },
            ),
            None => self.handler.handle(exchange),
        }
    }
}

/// Ordered filters plus a terminal handler.
pub struct FilterChain {
    filters: Vec<Box<dyn Filter>>,
    handler: Arc<dyn Handler>,
}

impl FilterChain {
    pub fn builder(handler: impl Handler + 'static) -> FilterChainBuilder {
        FilterChainBuilder {
            filters: Vec::new(),
            handler: Arc::new(handler),
        }
    }

    /// Run an exchange through every filter and the handler.
    pub fn handle(&self, exchange: &mut Exchange) -> Result<(), ExchangeError> {
        Next {
            filters: &self.filters,
            handler: self.handler.as_ref(),
        }
        .run(exchange)
    }

    pub fn descriptions(&self) -> Vec<&'static str> {
        self.filters.iter().map(|f| f.description()).collect()
    }

    pub fn handler_name(&self) -> &str {
        self.handler.name()
    }
}

impl fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterChain")
            .field("filters", &self.descriptions())
            .field("handler", &self.handler_name())
            .finish()
    }
}

pub struct FilterChainBuilder {
    filters: Vec<Box<dyn Filter>>,
    handler: Arc<dyn Handler>,
}

impl FilterChainBuilder {
    /// Append a filter; filters run in the order they are added.
    pub fn filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn build(self) -> FilterChain {
        FilterChain {
            filters: self.filters,
            handler: self.handler,
        }
    }
}

/// Which header sets the logging filter renders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraceSettings {
    pub requests: bool,
    pub responses: bool,
}

/// Logs each exchange before and after the rest of the chain runs.
pub struct LoggingFilter<L> {
    log: L,
    settings: TraceSettings,
}

impl<L: ExchangeLog> LoggingFilter<L> {
    pub fn new(log: L, settings: TraceSettings) -> Self {
        Self { log, settings }
    }
}

impl<L: ExchangeLog> Filter for LoggingFilter<L> {
    fn description(&self) -> &'static str {
        "Logs request and response headers around handler execution"
    }

    fn process(&self, exchange: &mut Exchange, next: Next<'_>) -> Result<(), ExchangeError> {
        self.log.record(LogEntry::Trace("exchange processing started".into()));
        if self.settings.requests {
            self.log.record(LogEntry::Request {
                path: exchange.path().to_string(),
                method: exchange.method().to_string(),
                headers: exchange.request_headers().flatten(),
            });
        }
        self.log.record(LogEntry::Trace(format!(
            "exchange handled by {}",
            next.handler_name()
        )));

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| next.run(exchange)));

        match &outcome {
            Ok(Err(err)) => self.log.record(LogEntry::Warning(format!("{err:?}"))),
            Err(payload) => self.log.record(LogEntry::Warning(format!(
                "panic: {}",
                panic_message(payload.as_ref())
            ))),
            Ok(Ok(())) => {}
        }

        if self.settings.responses {
            self.log.record(LogEntry::Response {
                headers: exchange.response_headers().flatten(),
            });
        }
        self.log.record(LogEntry::Trace("exchange processing finished".into()));

        match outcome {
            Ok(result) => result,
            Err(payload) => panic::resume_unwind(payload),
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}
