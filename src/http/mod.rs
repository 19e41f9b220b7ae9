//! HTTP interception layer.
//!
//! # Data Flow
//! ```text
//! axum request
//!     → server.rs (context lookup, middleware, blocking dispatch)
//!     → request.rs (request ID, body read, Exchange built)
//!     → filter.rs (filters wrap the handler, failures pass through)
//!     → diagnostic.rs / other handlers
//!         → canned.rs → exchange.rs → stream.rs (single write path)
//!     → response.rs (Exchange → axum response)
//!     → Send to client
//! ```

pub mod canned;
pub mod diagnostic;
pub mod exchange;
pub mod filter;
pub mod headers;
pub mod interrupt;
pub mod request;
pub mod response;
pub mod server;
pub mod stream;

pub use exchange::{Exchange, ExchangeError};
pub use filter::{Filter, FilterChain, Handler, LoggingFilter, Next, TraceSettings};
pub use headers::Headers;
pub use request::X_REQUEST_ID;
pub use server::HttpServer;
pub use stream::{DecoratedStream, WriteChunk};
