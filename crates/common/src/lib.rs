//! DocRepo Common Library
//!
//! Shared code for the DocRepo admin tooling including:
//! - Typed HTTP client for the admin backend (CSRF, method override, envelopes)
//! - Admin API abstraction with an HTTP implementation
//! - Wire models for documents, projects, publications and authors
//! - Error types and handling
//! - Configuration management
//! - Per-session lookup cache
//! - Metrics and observability

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod errors;
pub mod markup;
pub mod metrics;
pub mod models;

// Re-export commonly used types
pub use api::{AdminApi, HttpAdminApi};
pub use cache::LookupCache;
pub use client::ApiClient;
pub use config::AppConfig;
pub use errors::{AppError, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// MIME type the backend accepts for document uploads
pub const PDF_MIME: &str = "application/pdf";
