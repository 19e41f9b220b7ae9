//! Request/response interception layer for the feed agent's HTTP server.

pub mod archive;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use archive::FeedArchiver;
pub use config::AgentConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
