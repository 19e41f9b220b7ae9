//! Response handover to the engine.
//!
//! # Responsibilities
//! - Turn a finished exchange into an axum response
//! - Produce the engine's own fallback when the chain failed
//!
//! # Design Decisions
//! - `Content-Length` is left to the engine, which knows the final body
//! - Headers that are not valid HTTP are dropped with a warning rather than
//!   failing the whole response

use axum::body::Body;
use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::http::canned::MessageKey;
use crate::http::exchange::ResponseParts;

/// Build the wire response from what the chain wrote.
pub fn into_response(parts: ResponseParts) -> Response {
    let Some(status) = parts.status else {
        tracing::warn!("Exchange finished without sending a response");
        return engine_failure();
    };

    let mut response = Response::new(Body::from(parts.body));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    for (name, value) in parts.headers.pairs() {
        let name = match HeaderName::from_bytes(name.as_bytes()) {
            Ok(name) => name,
            Err(_) => {
                tracing::warn!(header = %name, "Dropping invalid response header name");
                continue;
            }
        };
        if name == header::CONTENT_LENGTH {
            continue;
        }
        match HeaderValue::from_str(value) {
            Ok(value) => {
                headers.append(name, value);
            }
            Err(_) => tracing::warn!(header = %name, "Dropping invalid response header value"),
        }
    }
    response
}

/// What the engine answers when the chain raised instead of responding.
pub fn engine_failure() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        MessageKey::InternalError.text(),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::headers::Headers;

    #[test]
    fn parts_map_onto_response() {
        let mut headers = Headers::new();
        headers.append("Content-Type", "text/plain");
        headers.append("Set-Cookie", "a=1");
        headers.append("Set-Cookie", "b=2");
        headers.append("content-length", "999");
        headers.append("bad header", "x");

        let response = into_response(ResponseParts {
            status: Some(StatusCode::CREATED),
            headers,
            body: b"body".to_vec(),
            closed: true,
        });

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()["content-type"], "text/plain");
        assert_eq!(response.headers().get_all("set-cookie").iter().count(), 2);
        assert!(response.headers().get("content-length").is_none());
    }

    #[test]
    fn missing_status_is_an_engine_failure() {
        let response = into_response(ResponseParts {
            status: None,
            headers: Headers::new(),
            body: Vec::new(),
            closed: false,
        });
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn engine_failure_uses_internal_error_text() {
        let response = engine_failure();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body, MessageKey::InternalError.text());
    }
}
