//! Dispatcher (broker) subsystem.
//!
//! # Data Flow
//! ```text
//! classify(item)
//!     → snapshot registry (N filters)
//!     → spawn N tasks, one per filter          (fan-out)
//!     → each task sends FilterResult on a per-call mpsc channel
//!     → collector drains until pending == 0    (fan-in)
//!        or the deadline expires (abort stragglers)
//!     → ClassificationResult { item, tags }
//! ```
//!
//! # Design Decisions
//! - Channels are allocated per call; concurrent calls never share one
//! - Pending count is decremented only by the collector, one message at a time
//! - Zero filters completes immediately with no tags
//! - Every call is bounded by `classify_timeout`
//! - Tags are returned sorted and deduplicated

pub mod broker;
pub mod error;
pub mod types;

pub use broker::Dispatcher;
pub use error::{ClassifyError, RegistrationError};
pub use types::ClassificationResult;
