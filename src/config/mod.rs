//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AgentConfig (validated, immutable)
//!     → filter chains and archiver built once at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the filter chain never changes while serving
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::AgentConfig;
pub use schema::ArchiveConfig;
pub use schema::DiagnosticConfig;
pub use schema::ListenerConfig;
pub use schema::ObservabilityConfig;
pub use schema::PlatformConfig;
pub use schema::TimeoutConfig;
