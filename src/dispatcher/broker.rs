//! Fan-out/fan-in dispatcher.
//!
//! # Responsibilities
//! - Own the registry of filters
//! - Broadcast each item to every filter concurrently
//! - Collect exactly one result per dispatched filter
//! - Bound the wait and cancel stragglers on timeout

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time;

use crate::config::{CategorizerConfig, DispatcherConfig, TimeoutPolicy};
use crate::dispatcher::error::{ClassifyError, RegistrationError};
use crate::dispatcher::types::ClassificationResult;
use crate::filter::{Filter, FilterResult, KeywordFilter};
use crate::observability::metrics;

/// Coordinates one classification across all registered filters.
///
/// Filter evaluation is synchronous; a CPU-bound filter only lets the
/// deadline fire on a multi-threaded runtime.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    filters: Vec<Arc<dyn Filter>>,
    timeout: Duration,
    on_timeout: TimeoutPolicy,
}

impl Dispatcher {
    /// Create an empty dispatcher with default timeout settings.
    pub fn new() -> Self {
        Self::with_config(&DispatcherConfig::default())
    }

    /// Create an empty dispatcher with explicit timeout settings.
    pub fn with_timeout(timeout: Duration, on_timeout: TimeoutPolicy) -> Self {
        Self {
            filters: Vec::new(),
            timeout,
            on_timeout,
        }
    }

    /// Create an empty dispatcher from the `[dispatcher]` config section.
    pub fn with_config(config: &DispatcherConfig) -> Self {
        Self::with_timeout(
            Duration::from_millis(config.classify_timeout_ms),
            config.on_timeout,
        )
    }

    /// Build a dispatcher and register every configured category.
    pub fn from_config(config: &CategorizerConfig) -> Result<Self, RegistrationError> {
        let mut dispatcher = Self::with_config(&config.dispatcher);
        for category in &config.categories {
            dispatcher.register_filter(category.name.clone(), category.patterns.clone())?;
        }

        tracing::info!(
            filters = dispatcher.len(),
            timeout_ms = dispatcher.timeout.as_millis() as u64,
            on_timeout = ?dispatcher.on_timeout,
            "Dispatcher initialized"
        );
        Ok(dispatcher)
    }

    /// Register a keyword filter for a category.
    pub fn register_filter<I, S>(
        &mut self,
        name: impl Into<String>,
        patterns: I,
    ) -> Result<(), RegistrationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let filter = KeywordFilter::new(name, patterns)?;
        self.register(filter)
    }

    /// Register any filter implementation. Names must be unique.
    pub fn register<F>(&mut self, filter: F) -> Result<(), RegistrationError>
    where
        F: Filter + 'static,
    {
        if self.filters.iter().any(|f| f.name() == filter.name()) {
            return Err(RegistrationError::DuplicateName {
                name: filter.name().to_string(),
            });
        }

        tracing::debug!(
            filter = %filter.name(),
            patterns = filter.patterns().len(),
            "Filter registered"
        );
        self.filters.push(Arc::new(filter));
        Ok(())
    }

    /// Registered filters, in registration order.
    pub fn filters(&self) -> impl Iterator<Item = &dyn Filter> {
        self.filters.iter().map(|f| f.as_ref())
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Classify one item against every registered filter.
    pub async fn classify(&self, item: &str) -> Result<ClassificationResult, ClassifyError> {
        let start = Instant::now();
        let snapshot = self.filters.clone();

        if snapshot.is_empty() {
            tracing::debug!("No filters registered, returning empty tag set");
            metrics::record_classification("empty", start);
            return Ok(ClassificationResult::new(item, BTreeSet::new()));
        }

        let mut pending: BTreeSet<String> =
            snapshot.iter().map(|f| f.name().to_string()).collect();
        let shared_item: Arc<str> = Arc::from(item);
        let (tx, mut rx) = mpsc::channel::<FilterResult>(snapshot.len());
        let mut tasks = JoinSet::new();

        for filter in snapshot {
            let tx = tx.clone();
            let item = Arc::clone(&shared_item);
            tasks.spawn(async move {
                let result = filter.evaluate(&item);
                // Receiver is dropped once the call has given up.
                let _ = tx.send(result).await;
            });
        }
        // The channel closes once every task has sent or died.
        drop(tx);

        let mut tags = BTreeSet::new();
        let outcome = time::timeout(self.timeout, collect(&mut rx, &mut pending, &mut tags)).await;

        if pending.is_empty() {
            tracing::debug!(
                tags = ?tags,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Classification complete"
            );
            metrics::record_classification("complete", start);
            return Ok(ClassificationResult::new(item, tags));
        }

        tasks.abort_all();
        let pending: Vec<String> = pending.into_iter().collect();
        let (error, outcome_label) = match outcome {
            Ok(()) => (ClassifyError::FilterLost { pending }, "lost"),
            Err(_) => (
                ClassifyError::Timeout {
                    pending,
                    elapsed: start.elapsed(),
                },
                "timeout",
            ),
        };

        match self.on_timeout {
            TimeoutPolicy::Fail => {
                tracing::warn!(error = %error, "Classification failed");
                metrics::record_classification(outcome_label, start);
                Err(error)
            }
            TimeoutPolicy::Partial => {
                tracing::warn!(
                    error = %error,
                    tags = ?tags,
                    "Returning partial classification"
                );
                metrics::record_classification("partial", start);
                Ok(ClassificationResult::partial(item, tags))
            }
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Drain filter reports until nothing is pending or the channel closes.
async fn collect(
    rx: &mut mpsc::Receiver<FilterResult>,
    pending: &mut BTreeSet<String>,
    tags: &mut BTreeSet<String>,
) {
    while !pending.is_empty() {
        let Some(result) = rx.recv().await else {
            break;
        };

        if !pending.remove(&result.name) {
            tracing::warn!(filter = %result.name, "Ignoring duplicate filter report");
            continue;
        }
        if result.matched {
            metrics::record_filter_match(&result.name);
            tags.insert(result.name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Blocks its worker thread before reporting.
    #[derive(Debug)]
    struct StallingFilter {
        name: String,
        delay: Duration,
    }

    impl Filter for StallingFilter {
        fn name(&self) -> &str {
            &self.name
        }

        fn patterns(&self) -> &[String] {
            &[]
        }

        fn evaluate(&self, _item: &str) -> FilterResult {
            std::thread::sleep(self.delay);
            FilterResult::new(self.name.clone(), true)
        }
    }

    #[derive(Debug)]
    struct PanickingFilter;

    impl Filter for PanickingFilter {
        fn name(&self) -> &str {
            "broken"
        }

        fn patterns(&self) -> &[String] {
            &[]
        }

        fn evaluate(&self, _item: &str) -> FilterResult {
            panic!("filter exploded");
        }
    }

    fn meat_and_beef() -> Dispatcher {
        let mut d = Dispatcher::new();
        d.register_filter("meat", ["chuck", "mignon", "roast", "steak"]).unwrap();
        d.register_filter("beef", ["london broil", "chuck", "tri-tip", "beef"]).unwrap();
        d
    }

    #[tokio::test]
    async fn test_meat_and_beef_scenario() {
        let d = meat_and_beef();

        let result = d.classify("Chuck roast").await.unwrap();
        assert_eq!(result.item, "Chuck roast");
        assert_eq!(result.tags, vec!["beef", "meat"]);
        assert!(result.complete);

        let result = d.classify("chicken breast").await.unwrap();
        assert!(result.tags.is_empty());

        let result = d.classify("beef tri-tip").await.unwrap();
        assert_eq!(result.tags, vec!["beef"]);
    }

    #[tokio::test]
    async fn test_case_insensitive() {
        let d = meat_and_beef();
        let upper = d.classify("STEAK").await.unwrap();
        let lower = d.classify("steak").await.unwrap();
        assert_eq!(upper.tags, lower.tags);
        assert_eq!(upper.tags, vec!["meat"]);
    }

    #[tokio::test]
    async fn test_zero_filters_completes_immediately() {
        let d = Dispatcher::with_timeout(Duration::from_secs(60), TimeoutPolicy::Fail);
        let start = Instant::now();
        let result = d.classify("anything").await.unwrap();
        assert_eq!(result.item, "anything");
        assert!(result.tags.is_empty());
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_registration_order_does_not_change_tags() {
        let mut reversed = Dispatcher::new();
        reversed.register_filter("beef", ["london broil", "chuck", "tri-tip", "beef"]).unwrap();
        reversed.register_filter("meat", ["chuck", "mignon", "roast", "steak"]).unwrap();
        let forward = meat_and_beef();

        for item in ["Chuck roast", "beef tri-tip", "mignon", "salad"] {
            let a = forward.classify(item).await.unwrap();
            let b = reversed.classify(item).await.unwrap();
            assert_eq!(a, b, "item {item:?}");
        }
    }

    #[tokio::test]
    async fn test_repeated_calls_are_idempotent() {
        let d = meat_and_beef();
        let first = d.classify("London Broil with chuck").await.unwrap();
        for _ in 0..10 {
            assert_eq!(d.classify("London Broil with chuck").await.unwrap(), first);
        }
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut d = meat_and_beef();
        let err = d.register_filter("meat", ["ribeye"]).unwrap_err();
        assert_eq!(err, RegistrationError::DuplicateName { name: "meat".into() });
        assert_eq!(d.len(), 2);
    }

    #[test]
    fn test_empty_patterns_rejected() {
        let mut d = Dispatcher::new();
        let err = d.register_filter("veg", Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, RegistrationError::NoPatterns { .. }));
        assert!(d.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_timeout_fails_by_default() {
        let mut d = Dispatcher::with_timeout(Duration::from_millis(50), TimeoutPolicy::Fail);
        d.register_filter("meat", ["steak"]).unwrap();
        d.register(StallingFilter {
            name: "slow".into(),
            delay: Duration::from_millis(400),
        })
        .unwrap();

        let err = d.classify("steak").await.unwrap_err();
        match err {
            ClassifyError::Timeout { pending, elapsed } => {
                assert_eq!(pending, vec!["slow".to_string()]);
                assert!(elapsed < Duration::from_millis(400));
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_timeout_partial_policy_returns_arrived_tags() {
        let mut d = Dispatcher::with_timeout(Duration::from_millis(50), TimeoutPolicy::Partial);
        d.register_filter("meat", ["steak"]).unwrap();
        d.register(StallingFilter {
            name: "slow".into(),
            delay: Duration::from_millis(400),
        })
        .unwrap();

        let result = d.classify("steak").await.unwrap();
        assert!(!result.complete);
        assert_eq!(result.tags, vec!["meat"]);
    }

    #[tokio::test]
    async fn test_panicking_filter_does_not_hang() {
        let mut d = Dispatcher::with_timeout(Duration::from_secs(30), TimeoutPolicy::Fail);
        d.register_filter("meat", ["steak"]).unwrap();
        d.register(PanickingFilter).unwrap();

        let start = Instant::now();
        let err = d.classify("steak").await.unwrap_err();
        assert_eq!(err, ClassifyError::FilterLost { pending: vec!["broken".into()] });
        assert!(start.elapsed() < Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_partial_policy_survives_panicking_filter() {
        let mut d = Dispatcher::with_timeout(Duration::from_secs(30), TimeoutPolicy::Partial);
        d.register_filter("meat", ["steak"]).unwrap();
        d.register(PanickingFilter).unwrap();

        let start = Instant::now();
        let result = d.classify("steak").await.unwrap();
        assert!(!result.complete);
        assert_eq!(result.tags, vec!["meat"]);
        assert!(start.elapsed() < Duration::from_secs(30));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_calls_do_not_cross_contaminate() {
        let d = Arc::new(meat_and_beef());
        let mut handles = Vec::new();

        for i in 0..100 {
            let d = Arc::clone(&d);
            handles.push(tokio::spawn(async move {
                let (item, expected): (String, Vec<&str>) = match i % 4 {
                    0 => (format!("steak #{i}"), vec!["meat"]),
                    1 => (format!("tri-tip #{i}"), vec!["beef"]),
                    2 => (format!("chuck #{i}"), vec!["beef", "meat"]),
                    _ => (format!("tofu #{i}"), vec![]),
                };
                let result = d.classify(&item).await.unwrap();
                assert_eq!(result.item, item);
                assert_eq!(result.tags, expected);
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }
    }
}
