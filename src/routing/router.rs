//! Context lookup.
//!
//! # Responsibilities
//! - Store mount paths with their filter chains
//! - Resolve a request path to the most specific context
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) prefix scan over contexts sorted longest-first
//! - Explicit `None` rather than a silent default context

use std::sync::Arc;

use crate::http::filter::FilterChain;
use crate::routing::matcher::PathPrefixMatcher;

/// A mount path and the chain serving it.
#[derive(Debug, Clone)]
pub struct Context {
    matcher: PathPrefixMatcher,
    chain: Arc<FilterChain>,
}

impl Context {
    pub fn new(mount_path: impl Into<String>, chain: FilterChain) -> Self {
        Self {
            matcher: PathPrefixMatcher::new(mount_path),
            chain: Arc::new(chain),
        }
    }

    pub fn mount_path(&self) -> &str {
        self.matcher.prefix()
    }

    pub fn chain(&self) -> &Arc<FilterChain> {
        &self.chain
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContextRouter {
    contexts: Vec<Context>,
}

impl ContextRouter {
    pub fn new(mut contexts: Vec<Context>) -> Self {
        // Longest mount path first; stable sort keeps registration order on ties.
        contexts.sort_by(|a, b| b.mount_path().len().cmp(&a.mount_path().len()));
        Self { contexts }
    }

    /// Find the most specific context whose mount path prefixes `path`.
    pub fn resolve(&self, path: &str) -> Option<&Context> {
        self.contexts.iter().find(|c| c.matcher.matches(path))
    }

    pub fn contexts(&self) -> &[Context] {
        &self.contexts
    }
}
