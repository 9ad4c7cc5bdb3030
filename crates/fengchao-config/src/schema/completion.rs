//! Default completion parameters applied to every request.

use serde::{Deserialize, Serialize};

/// Defaults for chat completion requests; per-request options override them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub model: String,
    /// Maximum generated tokens (valid range: 1-32768).
    pub max_tokens: u32,
    /// Timeout for non-streaming completion calls, in seconds (valid range: 1-3600).
    pub timeout_secs: u64,
    pub is_sensitive: bool,
    pub do_sample: bool,
    /// Sampling temperature (valid range: 0.0-2.0). Omitted from requests when unset.
    pub temperature: Option<f64>,
    /// Nucleus sampling (valid range: 0.0-1.0). Omitted from requests when unset.
    pub top_p: Option<f64>,
    pub stop: Vec<String>,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: "ERNIE-Bot-4".into(),
            max_tokens: 2000,
            timeout_secs: 60,
            is_sensitive: false,
            do_sample: false,
            temperature: None,
            top_p: None,
            stop: Vec::new(),
        }
    }
}
