//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check category definitions (unique names, non-empty patterns)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: CategorizerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::CategorizerConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    InvalidBindAddress(String),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    InvalidMetricsAddress(String),

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),

    #[error("categories[{index}] has an empty name")]
    EmptyCategoryName { index: usize },

    #[error("category '{name}' has no patterns")]
    NoPatterns { name: String },

    #[error("category '{name}' contains an empty pattern")]
    EmptyPattern { name: String },

    #[error("category '{name}' is defined more than once")]
    DuplicateCategory { name: String },
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &CategorizerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.listener.max_connections == 0 {
        errors.push(ValidationError::ZeroValue("listener.max_connections"));
    }
    if config.dispatcher.classify_timeout_ms == 0 {
        errors.push(ValidationError::ZeroValue("dispatcher.classify_timeout_ms"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroValue("timeouts.request_secs"));
    }
    if config.limits.max_body_size == 0 {
        errors.push(ValidationError::ZeroValue("limits.max_body_size"));
    }

    let mut seen = HashSet::new();
    for (index, category) in config.categories.iter().enumerate() {
        if category.name.trim().is_empty() {
            errors.push(ValidationError::EmptyCategoryName { index });
            continue;
        }
        if !seen.insert(category.name.as_str()) {
            errors.push(ValidationError::DuplicateCategory {
                name: category.name.clone(),
            });
        }
        if category.patterns.is_empty() {
            errors.push(ValidationError::NoPatterns {
                name: category.name.clone(),
            });
        } else if category.patterns.iter().any(|p| p.is_empty()) {
            errors.push(ValidationError::EmptyPattern {
                name: category.name.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::CategoryConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&CategorizerConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = CategorizerConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.dispatcher.classify_timeout_ms = 0;
        config.categories = vec![
            CategoryConfig::new("", ["x"]),
            CategoryConfig::new("veg", Vec::<String>::new()),
            CategoryConfig::new("fruit", ["apple", ""]),
            CategoryConfig::new("veg", ["carrot"]),
        ];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::InvalidBindAddress("not-an-address".into()),
                ValidationError::ZeroValue("dispatcher.classify_timeout_ms"),
                ValidationError::EmptyCategoryName { index: 0 },
                ValidationError::NoPatterns { name: "veg".into() },
                ValidationError::EmptyPattern { name: "fruit".into() },
                ValidationError::DuplicateCategory { name: "veg".into() },
            ]
        );
    }

    #[test]
    fn test_metrics_address_only_checked_when_enabled() {
        let mut config = CategorizerConfig::default();
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::InvalidMetricsAddress("nope".into())]
        );
    }

    #[test]
    fn test_no_categories_is_valid() {
        let mut config = CategorizerConfig::default();
        config.categories.clear();
        assert!(validate_config(&config).is_ok());
    }
}
