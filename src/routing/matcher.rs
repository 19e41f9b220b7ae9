//! Mount path matching.
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - Plain prefix test: `/delay` covers `/delay`, `/delay/x` and `/delayed`

/// Matches request paths starting with a mount path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_matcher() {
        let matcher = PathPrefixMatcher::new("/delay");
        assert!(matcher.matches("/delay"));
        assert!(matcher.matches("/delay/5"));
        assert!(matcher.matches("/delayed"));
        assert!(!matcher.matches("/DELAY"));
        assert!(!matcher.matches("/"));
    }

    #[test]
    fn root_matches_everything() {
        let matcher = PathPrefixMatcher::new("/");
        assert!(matcher.matches("/"));
        assert!(matcher.matches("/feeds/full"));
    }
}
