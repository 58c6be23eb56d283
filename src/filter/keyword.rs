//! Keyword filter.
//!
//! # Responsibilities
//! - Hold one category's keyword set
//! - Match items by case-insensitive substring search
//!
//! # Design Decisions
//! - Patterns are lowercased once at construction, items once per evaluation
//! - Empty patterns are rejected (an empty needle would match everything)
//! - Empty pattern list never matches; empty item never matches

use crate::dispatcher::RegistrationError;
use crate::filter::{Filter, FilterResult};

/// Matches items containing any of its keywords, ignoring case.
#[derive(Debug, Clone)]
pub struct KeywordFilter {
    name: String,
    /// Patterns as configured (for listing).
    patterns: Vec<String>,
    /// Lowercased copies used for matching.
    needles: Vec<String>,
}

impl KeywordFilter {
    /// Create a new keyword filter.
    ///
    /// Fails if the name is empty, the pattern list is empty, or any single
    /// pattern is empty.
    pub fn new<I, S>(name: impl Into<String>, patterns: I) -> Result<Self, RegistrationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RegistrationError::EmptyName);
        }

        let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
        if patterns.is_empty() {
            return Err(RegistrationError::NoPatterns { name });
        }
        if patterns.iter().any(|p| p.is_empty()) {
            return Err(RegistrationError::EmptyPattern { name });
        }

        let needles = patterns.iter().map(|p| p.to_lowercase()).collect();

        Ok(Self {
            name,
            patterns,
            needles,
        })
    }

    /// Returns true if any keyword occurs in `item`, ignoring case.
    pub fn matches(&self, item: &str) -> bool {
        if item.is_empty() {
            return false;
        }
        let haystack = item.to_lowercase();
        self.needles.iter().any(|needle| haystack.contains(needle.as_str()))
    }
}

impl Filter for KeywordFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn patterns(&self) -> &[String] {
        &self.patterns
    }

    fn evaluate(&self, item: &str) -> FilterResult {
        FilterResult::new(self.name.clone(), self.matches(item))
    }
}
