//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the categorizer.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CategorizerConfig {
    /// Listener configuration (bind address, connection cap).
    pub listener: ListenerConfig,

    /// Fan-out/fan-in settings.
    pub dispatcher: DispatcherConfig,

    /// HTTP timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Category definitions, one filter each.
    pub categories: Vec<CategoryConfig>,
}

impl Default for CategorizerConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            dispatcher: DispatcherConfig::default(),
            timeouts: TimeoutConfig::default(),
            limits: LimitsConfig::default(),
            observability: ObservabilityConfig::default(),
            categories: CategoryConfig::builtin(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3001").
    pub bind_address: String,

    /// Maximum concurrent in-flight requests (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3001".to_string(),
            max_connections: 10_000,
        }
    }
}

/// What `classify` does when filters miss the deadline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeoutPolicy {
    /// Return an error (HTTP 504).
    #[default]
    Fail,
    /// Return the tags of the filters that did report.
    Partial,
}

/// Dispatcher configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Upper bound on one classification in milliseconds.
    pub classify_timeout_ms: u64,

    /// Behavior when the bound is exceeded.
    pub on_timeout: TimeoutPolicy,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            classify_timeout_ms: 1_000,
            on_timeout: TimeoutPolicy::Fail,
        }
    }
}

/// Timeout configuration for the HTTP surface.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_size: 64 * 1024, // 64KB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// One category and its keywords.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CategoryConfig {
    /// Category name reported as a tag.
    pub name: String,

    /// Case-insensitive substrings; any one matching tags the item.
    pub patterns: Vec<String>,
}

impl CategoryConfig {
    pub fn new<I, S>(name: impl Into<String>, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    /// Categories used when the config file defines none.
    pub fn builtin() -> Vec<Self> {
        vec![
            Self::new("meat", ["chuck", "mignon", "roast", "steak"]),
            Self::new("beef", ["london broil", "chuck", "tri-tip", "beef"]),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: CategorizerConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:3001");
        assert_eq!(config.dispatcher.on_timeout, TimeoutPolicy::Fail);
        assert_eq!(config.categories, CategoryConfig::builtin());
    }

    #[test]
    fn test_parse_full_config() {
        let config: CategorizerConfig = toml::from_str(
            r#"
            [listener]
            bind_address = "127.0.0.1:4000"

            [dispatcher]
            classify_timeout_ms = 250
            on_timeout = "partial"

            [[categories]]
            name = "fish"
            patterns = ["salmon", "tuna"]
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.bind_address, "127.0.0.1:4000");
        assert_eq!(config.listener.max_connections, 10_000);
        assert_eq!(config.dispatcher.classify_timeout_ms, 250);
        assert_eq!(config.dispatcher.on_timeout, TimeoutPolicy::Partial);
        assert_eq!(config.categories, vec![CategoryConfig::new("fish", ["salmon", "tuna"])]);
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let result: Result<CategorizerConfig, _> = toml::from_str(
            r#"
            [dispatcher]
            on_timeout = "retry"
            "#,
        );
        assert!(result.is_err());
    }
}
