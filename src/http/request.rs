//! Request intake.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) when the client sent none
//! - Read the request body within the configured limit
//! - Build the [`Exchange`] handed to the filter chain
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - The body is read fully before the chain runs; the chain itself is synchronous

use axum::body::Body;
use axum::http::{HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::http::exchange::Exchange;
use crate::http::headers::Headers;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Request ID generator for `SetRequestIdLayer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Convert an engine request into an exchange.
pub async fn into_exchange(request: Request<Body>, max_body_bytes: usize) -> Result<Exchange, axum::Error> {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, max_body_bytes).await?;

    let mut exchange = Exchange::new(parts.method, parts.uri.path())
        .with_request_headers(Headers::from(&parts.headers))
        .with_request_body(body);
    if let Some(id) = parts
        .headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
    {
        exchange = exchange.with_request_id(id);
    }
    Ok(exchange)
}
