//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → shutdown.trigger()
//!
//! Shutdown (shutdown.rs):
//!     trigger → server stops accepting → in-flight requests drain
//!             → config reload task exits → process exits
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
