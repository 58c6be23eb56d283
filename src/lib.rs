//! Keyword categorization service library.

pub mod config;
pub mod dispatcher;
pub mod filter;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::schema::CategorizerConfig;
pub use dispatcher::{ClassificationResult, ClassifyError, Dispatcher, RegistrationError};
pub use filter::{Filter, FilterResult, KeywordFilter};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
