//! One request/response cycle.
//!
//! # Responsibilities
//! - Carry the request view handed over by the HTTP engine (method, path,
//!   headers, body, request ID)
//! - Collect the response: status, headers and the decorated body stream
//! - Enforce that response headers are sent at most once
//!
//! # Design Decisions
//! - Owned by exactly one thread while it moves through the filter chain
//! - The body sink is an in-memory buffer; the engine bridge turns it into
//!   the wire response once the chain returns

use std::io;

use axum::body::Bytes;
use axum::http::{header, Method, StatusCode};
use thiserror::Error;

use crate::http::headers::Headers;
use crate::http::interrupt::Interrupt;
use crate::http::stream::{DecoratedStream, Passthrough, WriteChunk};

/// Failure raised by a filter or handler.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// Transport or body-write failure.
    #[error("I/O failure: {0}")]
    Io(#[from] io::Error),

    /// Any other failure inside a filter or handler.
    #[error("{0}")]
    Runtime(String),
}

/// Response body: an in-memory sink behind the write decorator.
pub type ResponseBody = DecoratedStream<Vec<u8>, Box<dyn WriteChunk + Send>>;

/// The response half of a finished exchange.
#[derive(Debug)]
pub struct ResponseParts {
    pub status: Option<StatusCode>,
    pub headers: Headers,
    pub body: Vec<u8>,
    pub closed: bool,
}

pub struct Exchange {
    method: Method,
    path: String,
    request_id: Option<String>,
    request_headers: Headers,
    request_body: Bytes,
    status: Option<StatusCode>,
    response_headers: Headers,
    body: ResponseBody,
    interrupt: Interrupt,
}

impl Exchange {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            request_id: None,
            request_headers: Headers::new(),
            request_body: Bytes::new(),
            status: None,
            response_headers: Headers::new(),
            body: ResponseBody::new(Vec::new(), Box::new(Passthrough)),
            interrupt: Interrupt::new(),
        }
    }

    pub fn with_request_headers(mut self, headers: Headers) -> Self {
        self.request_headers = headers;
        self
    }

    pub fn with_request_header(mut self, name: &str, value: &str) -> Self {
        self.request_headers.append(name, value);
        self
    }

    pub fn with_request_body(mut self, body: Bytes) -> Self {
        self.request_body = body;
        self
    }

    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    /// Replace the write hook observing the response body.
    pub fn with_body_hook(mut self, hook: impl WriteChunk + Send + 'static) -> Self {
        self.body = ResponseBody::new(Vec::new(), Box::new(hook));
        self
    }

    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Request path, without the query string.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    pub fn request_headers(&self) -> &Headers {
        &self.request_headers
    }

    pub fn request_body(&self) -> &Bytes {
        &self.request_body
    }

    pub fn response_headers(&self) -> &Headers {
        &self.response_headers
    }

    pub fn response_headers_mut(&mut self) -> &mut Headers {
        &mut self.response_headers
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Whether response headers have been sent.
    pub fn is_committed(&self) -> bool {
        self.status.is_some()
    }

    /// Commit the status line and the body length.
    pub fn send_response_headers(&mut self, status: StatusCode, content_length: usize) -> io::Result<()> {
        if let Some(sent) = self.status {
            return Err(io::Error::other(format!(
                "response headers already sent with status {sent}"
            )));
        }
        self.response_headers
            .set(header::CONTENT_LENGTH.as_str(), content_length.to_string());
        self.status = Some(status);
        Ok(())
    }

    pub fn body(&mut self) -> &mut ResponseBody {
        &mut self.body
    }

    pub fn interrupt(&self) -> &Interrupt {
        &self.interrupt
    }

    pub fn into_response_parts(self) -> ResponseParts {
        let closed = self.body.is_closed();
        ResponseParts {
            status: self.status,
            headers: self.response_headers,
            body: self.body.into_inner().unwrap_or_default(),
            closed,
        }
    }
}

impl std::fmt::Debug for Exchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Exchange")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("request_id", &self.request_id)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_can_only_be_sent_once() {
        let mut exchange = Exchange::new(Method::GET, "/feed");
        assert!(!exchange.is_committed());
        exchange.send_response_headers(StatusCode::OK, 4).unwrap();
        assert!(exchange.is_committed());

        let err = exchange
            .send_response_headers(StatusCode::INTERNAL_SERVER_ERROR, 0)
            .unwrap_err();
        assert!(err.to_string().contains("already sent"));
        assert_eq!(exchange.status(), Some(StatusCode::OK));
        assert_eq!(exchange.response_headers().first("content-length"), Some("4"));
    }

    #[test]
    fn body_bytes_surface_in_response_parts() {
        let mut exchange = Exchange::new(Method::GET, "/feed")
            .with_request_header("Accept", "text/xml")
            .with_request_id("abc");
        exchange.send_response_headers(StatusCode::OK, 3).unwrap();
        exchange.body().write_bytes(b"ok!").unwrap();
        exchange.body().close().unwrap();

        assert_eq!(exchange.request_id(), Some("abc"));
        assert_eq!(exchange.request_headers().first("accept"), Some("text/xml"));
        let parts = exchange.into_response_parts();
        assert_eq!(parts.status, Some(StatusCode::OK));
        assert_eq!(parts.body, b"ok!");
        assert!(parts.closed);
    }
}
