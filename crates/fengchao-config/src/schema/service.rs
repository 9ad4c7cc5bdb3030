//! Service endpoint and credential configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where the service lives and how to authenticate against it.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL, e.g. `https://fengchao.example.com/api`.
    pub base_url: String,
    pub api_key: String,
    pub secret_key: String,
    /// Timeout for token and model-catalog requests, in seconds (valid range: 1-300).
    pub request_timeout_secs: u64,
    /// TCP connect timeout, in seconds (valid range: 1-60).
    pub connect_timeout_secs: u64,
    /// Token cache lifetime, in seconds (valid range: 60-3600).
    pub token_ttl_secs: u64,
    /// Model catalog cache lifetime, in seconds.
    pub models_ttl_secs: u64,
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("secret_key", &"[REDACTED]")
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("models_ttl_secs", &self.models_ttl_secs)
            .finish()
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            secret_key: String::new(),
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            token_ttl_secs: 1700,
            models_ttl_secs: 24 * 60 * 60,
        }
    }
}

impl ServiceConfig {
    pub fn new(
        api_key: impl Into<String>,
        secret_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            secret_key: secret_key.into(),
            ..Self::default()
        }
    }

    pub fn has_credentials(&self) -> bool {
        !self.api_key.is_empty() && !self.secret_key.is_empty()
    }
}
