//! Rust client for the categorizer HTTP API.

pub mod client;

pub use client::{CategorizerClient, Category, Classification};
