//! HTTP client for the admin backend
//!
//! One shared client for every admin call:
//! - CSRF header on mutating requests
//! - `_method` override for PUT/PATCH/DELETE
//! - `{success, data, error, message}` envelope unwrapping
//! - Status-derived error messages when the server gives none

use crate::config::ApiConfig;
use crate::errors::{AppError, Result};
use crate::metrics::ApiCallTimer;
use reqwest::multipart::Form;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Response envelope used by every admin endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    /// Absent in some error bodies, which only carry `error`
    #[serde(default)]
    pub success: bool,

    pub data: Option<T>,

    #[serde(default)]
    pub error: Option<String>,

    #[serde(default)]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Server text explaining a failure: `error` first, then `message`
    pub fn failure_message(&self) -> Option<String> {
        self.error
            .clone()
            .or_else(|| self.message.clone())
            .filter(|m| !m.trim().is_empty())
    }

    /// Unwrap the envelope, keeping `data` optional
    pub fn into_result(self) -> Result<Option<T>> {
        if self.success {
            Ok(self.data)
        } else {
            Err(AppError::Api {
                status: None,
                message: self
                    .failure_message()
                    .unwrap_or_else(|| crate::errors::MSG_GENERIC.to_string()),
            })
        }
    }

    /// Unwrap the envelope, requiring `data`
    pub fn into_data(self, endpoint: &str) -> Result<T> {
        self.into_result()?.ok_or_else(|| AppError::InvalidResponse {
            endpoint: endpoint.to_string(),
            message: "response has no data".to_string(),
        })
    }
}

/// Typed client over the admin backend
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    csrf_token: Option<String>,
    csrf_header: String,
    method_override: bool,
}

impl ApiClient {
    /// Create a new client from configuration
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            csrf_token: config.csrf_token.clone(),
            csrf_header: config.csrf_header.clone(),
            method_override: config.method_override,
        })
    }

    /// Absolute URL for an endpoint path
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// GET a JSON document
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let request = self.http.get(self.url(path)).query(query);
        self.execute(Method::GET, path, request).await
    }

    /// Send a JSON body, applying the method override when configured
    pub async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        let (method, body) = override_method(method, body, self.method_override);

        let request = self
            .with_csrf(self.http.request(method.clone(), self.url(path)))
            .json(&body);
        self.execute(method, path, request).await
    }

    /// POST a multipart form
    pub async fn send_multipart<T: DeserializeOwned>(&self, path: &str, form: Form) -> Result<T> {
        let request = self.with_csrf(self.http.post(self.url(path))).multipart(form);
        self.execute(Method::POST, path, request).await
    }

    fn with_csrf(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.csrf_token {
            Some(token) => request.header(self.csrf_header.as_str(), token.as_str()),
            None => request,
        }
    }

    async fn execute<T: DeserializeOwned>(&self, method: Method, path: &str, request: RequestBuilder) -> Result<T> {
        let timer = ApiCallTimer::start(method.as_str(), path);
        debug!(method = %method, endpoint = path, "Sending admin request");

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                timer.finish(0);
                warn!(method = %method, endpoint = path, error = %e, "Admin request failed");
                return Err(e.into());
            }
        };

        let status = response.status();
        timer.finish(status.as_u16());

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let server_message = serde_json::from_str::<ApiResponse<Value>>(&body)
                .ok()
                .and_then(|envelope| envelope.failure_message());
            warn!(
                method = %method,
                endpoint = path,
                status = status.as_u16(),
                server_message = server_message.as_deref().unwrap_or(""),
                "Admin request rejected"
            );
            return Err(AppError::from_status(status, server_message));
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| {
            warn!(method = %method, endpoint = path, error = %e, "Unreadable admin response");
            AppError::InvalidResponse {
                endpoint: path.to_string(),
                message: e.to_string(),
            }
        })
    }
}

/// Rewrite PUT/PATCH/DELETE as POST carrying `_method` in the body.
pub fn override_method(method: Method, body: Value, enabled: bool) -> (Method, Value) {
    let overridable = method == Method::PUT || method == Method::PATCH || method == Method::DELETE;
    if !enabled || !overridable {
        return (method, body);
    }

    let mut object = match body {
        Value::Object(map) => map,
        Value::Null => serde_json::Map::new(),
        other => {
            let mut map = serde_json::Map::new();
            map.insert("data".to_string(), other);
            map
        }
    };
    object.insert("_method".to_string(), Value::String(method.as_str().to_string()));
    (Method::POST, Value::Object(object))
}
