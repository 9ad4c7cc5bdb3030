//! HTTP client: construction, token and model-catalog caches.

mod auth;
mod models;

use std::time::Duration;

use fengchao_config::{validation, CompletionConfig, FengchaoConfig, ServiceConfig};
use reqwest::StatusCode;
use tracing::debug;

use crate::completion::{ChatCompletionError, CompletionOptions};
use crate::stream::DEFAULT_LINE_CAPACITY;
use crate::ClientError;

pub use models::{Model, LOCAL_MODEL_CHANNEL};

pub(crate) use auth::TokenCache;
pub(crate) use models::ModelCache;

const ERROR_BODY_PREVIEW: usize = 200;

/// FengChao API client.
///
/// Cheap to share behind an `Arc`; the token and model caches are guarded
/// by async mutexes.
pub struct FengchaoClient {
    pub(crate) service: ServiceConfig,
    pub(crate) defaults: CompletionConfig,
    pub(crate) http: reqwest::Client,
    pub(crate) tokens: TokenCache,
    pub(crate) models: ModelCache,
    pub(crate) line_capacity: usize,
}

impl FengchaoClient {
    /// Client with default completion settings.
    pub fn new(
        api_key: impl Into<String>,
        secret_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, ClientError> {
        let config = FengchaoConfig {
            service: ServiceConfig::new(api_key, secret_key, base_url),
            ..FengchaoConfig::default()
        };
        Self::from_config(&config)
    }

    pub fn from_config(config: &FengchaoConfig) -> Result<Self, ClientError> {
        validation::validate_for_client(config)?;

        let service = config.service.clone();
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(service.connect_timeout_secs))
            .build()
            .map_err(|e| ClientError::NetworkError(e.to_string()))?;

        debug!(
            base_url = %service.base_url,
            model = %config.completion.model,
            "FengChao client created"
        );

        Ok(Self {
            tokens: TokenCache::new(Duration::from_secs(service.token_ttl_secs)),
            models: ModelCache::new(Duration::from_secs(service.models_ttl_secs)),
            service,
            defaults: config.completion.clone(),
            http,
            line_capacity: DEFAULT_LINE_CAPACITY,
        })
    }

    /// Buffer size for streamed lines; longer lines arrive in fragments.
    pub fn with_line_capacity(mut self, capacity: usize) -> Self {
        self.line_capacity = capacity;
        self
    }

    /// Fresh request options seeded from the configured defaults.
    pub fn options(&self) -> CompletionOptions {
        CompletionOptions::from_config(&self.defaults)
    }

    pub fn base_url(&self) -> &str {
        &self.service.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.service.base_url.trim_end_matches('/'), path)
    }

    pub(crate) fn basic_timeout(&self) -> Duration {
        Duration::from_secs(self.service.request_timeout_secs)
    }

    pub(crate) fn completion_timeout(&self) -> Duration {
        Duration::from_secs(self.defaults.timeout_secs)
    }
}

pub(crate) fn send_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        ClientError::Timeout
    } else {
        ClientError::NetworkError(err.to_string())
    }
}

/// Turn a non-success response into an error, preferring the service's
/// `{"detail":[{"msg":...}]}` body from the first line.
pub(crate) async fn error_from_response(response: reqwest::Response) -> ClientError {
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return ClientError::RateLimited;
    }
    let text = response.text().await.unwrap_or_default();
    let first_line = text.lines().next().unwrap_or_default();
    match serde_json::from_str::<ChatCompletionError>(first_line) {
        Ok(detail) if !detail.detail.is_empty() => ClientError::Completion(detail.to_string()),
        _ => {
            let preview: String = text.chars().take(ERROR_BODY_PREVIEW).collect();
            ClientError::ApiError(format!("HTTP {status}: {preview}"))
        }
    }
}
