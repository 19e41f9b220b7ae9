//! Complete, closed responses written in one call.
//!
//! Handlers finish an exchange either with [`respond`] (explicit body) or
//! [`canned_respond`] (body looked up from a message key).

use std::io;

use axum::http::{header, StatusCode};

use crate::http::exchange::Exchange;

pub const TEXT_PLAIN_UTF8: &str = "text/plain; charset=utf-8";

/// Keys for user-visible response text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    MethodNotAllowed,
    NotFound,
    InternalError,
}

impl MessageKey {
    /// Translation key, as it appears in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKey::MethodNotAllowed => "http.method_not_allowed",
            MessageKey::NotFound => "http.not_found",
            MessageKey::InternalError => "http.internal_error",
        }
    }

    pub fn text(&self) -> &'static str {
        match self {
            MessageKey::MethodNotAllowed => "Method not allowed",
            MessageKey::NotFound => "Not found",
            MessageKey::InternalError => "Internal Server Error",
        }
    }
}

/// Send status, content type and body, then close the response stream.
pub fn respond(
    exchange: &mut Exchange,
    status: StatusCode,
    content_type: &str,
    body: &[u8],
) -> io::Result<()> {
    if let Some(sent) = exchange.status() {
        return Err(io::Error::other(format!(
            "response already committed with status {sent}"
        )));
    }
    exchange
        .response_headers_mut()
        .set(header::CONTENT_TYPE.as_str(), content_type);
    exchange.send_response_headers(status, body.len())?;
    let stream = exchange.body();
    stream.write_bytes(body)?;
    stream.close()
}

/// Respond with the text registered for `key`.
pub fn canned_respond(exchange: &mut Exchange, status: StatusCode, key: MessageKey) -> io::Result<()> {
    tracing::debug!(key = key.as_str(), status = %status, "Canned response");
    respond(exchange, status, TEXT_PLAIN_UTF8, key.text().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;

    #[test]
    fn respond_writes_a_closed_response() {
        let mut exchange = Exchange::new(Method::GET, "/");
        respond(&mut exchange, StatusCode::OK, "text/xml", b"<feed/>").unwrap();

        let parts = exchange.into_response_parts();
        assert_eq!(parts.status, Some(StatusCode::OK));
        assert_eq!(parts.headers.first("content-type"), Some("text/xml"));
        assert_eq!(parts.headers.first("content-length"), Some("7"));
        assert_eq!(parts.body, b"<feed/>");
        assert!(parts.closed);
    }

    #[test]
    fn canned_respond_uses_message_text() {
        let mut exchange = Exchange::new(Method::GET, "/");
        canned_respond(&mut exchange, StatusCode::NOT_FOUND, MessageKey::NotFound).unwrap();

        let parts = exchange.into_response_parts();
        assert_eq!(parts.status, Some(StatusCode::NOT_FOUND));
        assert_eq!(parts.headers.first("content-type"), Some(TEXT_PLAIN_UTF8));
        assert_eq!(parts.body, b"Not found");
    }

    #[test]
    fn second_response_is_refused() {
        let mut exchange = Exchange::new(Method::GET, "/");
        respond(&mut exchange, StatusCode::OK, "text/xml", b"<feed/>").unwrap();
        assert!(canned_respond(&mut exchange, StatusCode::NOT_FOUND, MessageKey::NotFound).is_err());

        let parts = exchange.into_response_parts();
        assert_eq!(parts.status, Some(StatusCode::OK));
        assert_eq!(parts.headers.first("content-type"), Some("text/xml"));
        assert_eq!(parts.headers.first("content-length"), Some("7"));
        assert_eq!(parts.body, b"<feed/>");
    }
}
