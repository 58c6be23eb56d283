//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, extract `item` from query/form/JSON)
//!     → Dispatcher::classify
//!     → response.rs (map errors to status codes)
//!     → JSON `{item, tags}` to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{ItemParams, MakeRequestUuid, X_REQUEST_ID};
pub use response::ApiError;
pub use server::{AppState, HttpServer};
