//! Filter subsystem.
//!
//! # Data Flow
//! ```text
//! CategoryConfig { name, patterns }
//!     → keyword.rs (normalize patterns, reject empties)
//!     → KeywordFilter (immutable, shared via Arc)
//!     → dispatcher evaluates it once per classification
//! ```
//!
//! # Design Decisions
//! - Filters are pure functions of (item, patterns); no per-call state
//! - Evaluation never fails; a filter always reports a result
//! - Substring matching only, no regex

pub mod keyword;

pub use keyword::KeywordFilter;

use serde::{Deserialize, Serialize};

/// A named matcher for one category.
pub trait Filter: Send + Sync + std::fmt::Debug {
    /// Category name reported when this filter matches.
    fn name(&self) -> &str;

    /// Patterns this filter was built from, as configured.
    fn patterns(&self) -> &[String];

    /// Evaluate a single item against this filter.
    fn evaluate(&self, item: &str) -> FilterResult;
}

/// Outcome of evaluating one filter against one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterResult {
    /// Category name of the filter that produced this result.
    pub name: String,
    /// Whether any pattern matched.
    pub matched: bool,
}

impl FilterResult {
    pub fn new(name: impl Into<String>, matched: bool) -> Self {
        Self {
            name: name.into(),
            matched,
        }
    }
}
