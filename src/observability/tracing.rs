//! Per-exchange spans.
//!
//! # Responsibilities
//! - Create one span per exchange carrying its correlation data
//! - Let the blocking worker re-enter the span opened on the async side

use tracing::Span;

/// Span wrapping every event logged while an exchange is processed.
pub fn exchange_span(request_id: Option<&str>, method: &str, path: &str) -> Span {
    tracing::info_span!(
        "exchange",
        request_id = request_id.unwrap_or("unknown"),
        method = %method,
        path = %path,
    )
}
