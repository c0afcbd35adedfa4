//! Configuration management for DocRepo tooling
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default, config/{APP_ENV}, config/local)
//! - Default values

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Admin backend connection
    #[serde(default)]
    pub api: ApiConfig,

    /// Lookup cache configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Wizard client-side checks
    #[serde(default)]
    pub wizard: WizardConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Server root, e.g. https://repositorio.example.org
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Public origin used to build publication URLs (falls back to base_url)
    pub origin: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// CSRF token sent on every mutating request
    pub csrf_token: Option<String>,

    /// Header carrying the CSRF token
    #[serde(default = "default_csrf_header")]
    pub csrf_header: String,

    /// Send PUT/PATCH/DELETE as POST with a `_method` field
    #[serde(default = "default_method_override")]
    pub method_override: bool,

    /// Endpoint paths, relative to base_url
    #[serde(default)]
    pub endpoints: EndpointsConfig,
}

/// Endpoint paths. `{id}` is replaced with the entity id.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EndpointsConfig {
    #[serde(default = "default_documents")]
    pub documents: String,
    #[serde(default = "default_document")]
    pub document: String,
    #[serde(default = "default_document_authors")]
    pub document_authors: String,
    #[serde(default = "default_projects")]
    pub projects: String,
    #[serde(default = "default_project")]
    pub project: String,
    #[serde(default = "default_project_types")]
    pub project_types: String,
    #[serde(default = "default_publications")]
    pub publications: String,
    #[serde(default = "default_slug_preview")]
    pub slug_preview: String,
    #[serde(default = "default_users")]
    pub users: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Entry lifetime in seconds (0 keeps entries until invalidated)
    #[serde(default)]
    pub ttl_secs: u64,

    /// Key prefix for namespacing
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WizardConfig {
    /// Largest accepted upload in bytes (0 disables the check)
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,

    /// MIME type required for the step 1 attachment
    #[serde(default = "default_required_mime")]
    pub required_mime: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level / env filter directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Service name for tracing
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

// Default value functions
fn default_base_url() -> String { "http://localhost:8000".to_string() }
fn default_timeout() -> u64 { 30 }
fn default_csrf_header() -> String { "X-CSRFToken".to_string() }
fn default_method_override() -> bool { true }
fn default_documents() -> String { "/api/documentos/".to_string() }
fn default_document() -> String { "/api/documentos/{id}/".to_string() }
fn default_document_authors() -> String { "/api/documentos/{id}/autores/".to_string() }
fn default_projects() -> String { "/api/proyectos/".to_string() }
fn default_project() -> String { "/api/proyectos/{id}/".to_string() }
fn default_project_types() -> String { "/api/tipos-proyecto/".to_string() }
fn default_publications() -> String { "/api/publicaciones/".to_string() }
fn default_slug_preview() -> String { "/api/publicaciones/generar-slug/".to_string() }
fn default_users() -> String { "/api/usuarios/".to_string() }
fn default_key_prefix() -> String { "docrepo".to_string() }
fn default_max_file_bytes() -> u64 { 50 * 1024 * 1024 }
fn default_required_mime() -> String { crate::PDF_MIME.to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { true }
fn default_service_name() -> String { "docrepo".to_string() }

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            origin: None,
            timeout_secs: default_timeout(),
            csrf_token: None,
            csrf_header: default_csrf_header(),
            method_override: default_method_override(),
            endpoints: EndpointsConfig::default(),
        }
    }
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            documents: default_documents(),
            document: default_document(),
            document_authors: default_document_authors(),
            projects: default_projects(),
            project: default_project(),
            project_types: default_project_types(),
            publications: default_publications(),
            slug_preview: default_slug_preview(),
            users: default_users(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 0,
            key_prefix: default_key_prefix(),
        }
    }
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: default_max_file_bytes(),
            required_mime: default_required_mime(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: default_json_logging(),
            service_name: default_service_name(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            cache: CacheConfig::default(),
            wizard: WizardConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl EndpointsConfig {
    /// Substitute `{id}` in an endpoint template
    pub fn with_id(template: &str, id: i64) -> String {
        template.replace("{id}", &id.to_string())
    }
}

impl ApiConfig {
    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl AppConfig {
    /// Layered load: `config/default`, `config/{APP_ENV}`, `config/local`,
    /// then `APP__` variables (`APP__API__BASE_URL=https://repositorio.example.org`)
    pub fn load() -> Result<Self, ConfigError> {
        let profile = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        ["config/default".to_string(), format!("config/{}", profile), "config/local".to_string()]
            .iter()
            .fold(Config::builder(), |builder, name| {
                builder.add_source(File::with_name(name).required(false))
            })
            .add_source(env_source())
            .build()?
            .try_deserialize()
    }

    /// Single file plus environment overrides
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(path))
            .add_source(env_source())
            .build()?
            .try_deserialize()
    }

    /// Public origin for publication URLs (falls back to base_url)
    pub fn public_origin(&self) -> &str {
        self.api
            .origin
            .as_deref()
            .unwrap_or(&self.api.base_url)
            .trim_end_matches('/')
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("APP").separator("__").try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.api.csrf_header, "X-CSRFToken");
        assert!(config.api.method_override);
        assert_eq!(config.wizard.required_mime, "application/pdf");
        assert_eq!(config.cache.ttl_secs, 0);
        assert_eq!(config.api.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_origin_fallback() {
        let mut config = AppConfig::default();
        assert_eq!(config.public_origin(), "http://localhost:8000");

        config.api.origin = Some("https://repositorio.example.org/".into());
        assert_eq!(config.public_origin(), "https://repositorio.example.org");
    }

    #[test]
    fn test_endpoint_id_substitution() {
        let endpoints = EndpointsConfig::default();
        assert_eq!(
            EndpointsConfig::with_id(&endpoints.document_authors, 42),
            "/api/documentos/42/autores/"
        );
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"api": {"base_url": "https://repo.test"}}"#).unwrap();
        assert_eq!(config.api.base_url, "https://repo.test");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.observability.log_level, "info");
    }
}
