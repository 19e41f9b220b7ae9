//! Context routing.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → router.rs (context lookup, longest mount path first)
//!     → matcher.rs (mount path prefix test)
//!     → Return: the context's filter chain, or no match
//!
//! Context registration (at startup):
//!     (mount path, FilterChain)[]
//!     → Sort by mount path length
//!     → Freeze as immutable ContextRouter
//! ```
//!
//! # Design Decisions
//! - Contexts registered at startup, immutable at runtime
//! - Prefix matching only; handlers apply any stricter path check themselves
//! - Deterministic: same path always resolves to the same context

pub mod matcher;
pub mod router;

pub use matcher::PathPrefixMatcher;
pub use router::{Context, ContextRouter};
