//! Classification result types.

use std::collections::BTreeSet;
use serde::{Deserialize, Serialize};

/// The aggregated answer for one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// The item exactly as it was submitted.
    pub item: String,

    /// Names of the categories that matched, sorted.
    pub tags: Vec<String>,

    /// False when the deadline passed and the partial timeout policy is in
    /// effect; `tags` then only covers the filters that reported.
    #[serde(default = "default_complete", skip_serializing_if = "is_complete")]
    pub complete: bool,
}

fn default_complete() -> bool {
    true
}

fn is_complete(complete: &bool) -> bool {
    *complete
}

impl ClassificationResult {
    /// Build a complete result from a set of matched names.
    pub fn new(item: impl Into<String>, tags: BTreeSet<String>) -> Self {
        Self {
            item: item.into(),
            tags: tags.into_iter().collect(),
            complete: true,
        }
    }

    /// Build a result for a call that gave up on some filters.
    pub fn partial(item: impl Into<String>, tags: BTreeSet<String>) -> Self {
        Self {
            complete: false,
            ..Self::new(item, tags)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_flag_omitted_when_true() {
        let tags: BTreeSet<String> = ["meat".to_string()].into_iter().collect();
        let json = serde_json::to_value(ClassificationResult::new("steak", tags)).unwrap();
        assert_eq!(json, serde_json::json!({ "item": "steak", "tags": ["meat"] }));
    }

    #[test]
    fn test_partial_serializes_flag() {
        let json = serde_json::to_value(ClassificationResult::partial("steak", BTreeSet::new())).unwrap();
        assert_eq!(json["complete"], serde_json::json!(false));
    }

    #[test]
    fn test_missing_flag_deserializes_as_complete() {
        let result: ClassificationResult =
            serde_json::from_str(r#"{"item":"x","tags":[]}"#).unwrap();
        assert!(result.complete);
    }
}
