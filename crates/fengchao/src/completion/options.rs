//! Per-request completion options.

use std::fmt;
use std::time::Duration;

use fengchao_common::RequestId;
use fengchao_config::CompletionConfig;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::prompt::{Message, Prompt, PromptError, Role};
use crate::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Invoke,
    Stream,
}

/// Body of a chat completion request, plus client-side settings that are
/// not sent (template variables and timeout).
///
/// Start from [`CompletionOptions::default`] or
/// [`CompletionOptions::from_config`] and chain `with_*` calls.
#[derive(Clone, Serialize)]
pub struct CompletionOptions {
    pub request_id: RequestId,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    pub do_sample: bool,
    pub is_sensitive: bool,
    #[serde(skip_serializing_if = "is_zero")]
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stop: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<Message>,
    pub query: String,
    pub system: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
    #[serde(rename = "prompt", skip_serializing_if = "Option::is_none")]
    pub predefined_prompt: Option<String>,

    #[serde(skip)]
    pub variables: Value,
    /// Explicit timeout. Non-streaming calls fall back to the configured
    /// default; streams are unbounded without one.
    #[serde(skip)]
    pub timeout: Option<Duration>,
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self::from_config(&CompletionConfig::default())
    }
}

impl fmt::Debug for CompletionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionOptions")
            .field("request_id", &self.request_id)
            .field("model", &self.model)
            .field("query", &self.query)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("history_len", &self.history.len())
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl CompletionOptions {
    pub fn from_config(config: &CompletionConfig) -> Self {
        Self {
            request_id: RequestId::new(),
            model: config.model.clone(),
            temperature: config.temperature,
            top_p: config.top_p,
            do_sample: config.do_sample,
            is_sensitive: config.is_sensitive,
            max_tokens: config.max_tokens,
            stop: config.stop.clone(),
            history: Vec::new(),
            query: String::new(),
            system: String::new(),
            mode: None,
            predefined_prompt: None,
            variables: Value::Object(Map::new()),
            timeout: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_top_p(mut self, top_p: f64) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn with_do_sample(mut self, do_sample: bool) -> Self {
        self.do_sample = do_sample;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_stop<I, S>(mut self, stop: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop = stop.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn with_predefined_prompt(mut self, name: impl Into<String>) -> Self {
        self.predefined_prompt = Some(name.into());
        self
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = system.into();
        self
    }

    pub fn with_is_sensitive(mut self, is_sensitive: bool) -> Self {
        self.is_sensitive = is_sensitive;
        self
    }

    pub fn with_history(mut self, history: Vec<Message>) -> Self {
        self.history = history;
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<RequestId>) -> Self {
        self.request_id = request_id.into();
        self
    }

    /// Template variables as a JSON object.
    pub fn with_variables(mut self, variables: Value) -> Self {
        self.variables = variables;
        self
    }

    /// Template variables from any serializable struct or map. Field names
    /// become placeholder names.
    pub fn with_variables_from<S: Serialize>(self, variables: &S) -> Result<Self, ClientError> {
        let value = serde_json::to_value(variables)
            .map_err(|e| ClientError::InvalidOption(format!("variables: {e}")))?;
        if !value.is_object() {
            return Err(ClientError::InvalidOption(
                "variables must serialize to a JSON object".into(),
            ));
        }
        Ok(self.with_variables(value))
    }

    /// Render `prompt` into this request.
    ///
    /// A leading system message becomes `system`, the last message must be
    /// from the user and becomes `query`, and whatever sits between is the
    /// history. Returns every rendered message, system included.
    pub fn apply_prompt(&mut self, prompt: &dyn Prompt) -> Result<Vec<Message>, PromptError> {
        let rendered = prompt.render_messages(&self.variables)?;

        let mut rest = rendered.as_slice();
        if let Some((first, tail)) = rest.split_first() {
            if first.role == Role::System {
                self.system = first.content.clone();
                rest = tail;
            }
        }

        let (last, history) = rest.split_last().ok_or(PromptError::NoUserMessages)?;
        if last.role != Role::User {
            return Err(PromptError::LastNotUser(last.role));
        }

        self.query = last.content.clone();
        self.history = history.to_vec();
        Ok(rendered)
    }

    pub(crate) fn effective_timeout(&self, default: Duration) -> Duration {
        self.timeout.unwrap_or(default)
    }
}
