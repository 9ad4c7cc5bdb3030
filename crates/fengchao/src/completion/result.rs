//! Completion responses and error payloads.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::prompt::{Message, PromptTemplate};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Choice {
    pub index: u32,
    pub role: String,
    pub finish_reason: String,
    pub message: Message,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// One completion response, or one frame of a streamed response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatCompletionResult {
    pub request_id: String,
    pub object: String,
    pub created: String,
    pub choices: Vec<Choice>,
    pub usage: Usage,
    pub msg: String,
    pub status: i64,
    /// Rendered prompt plus the assistant reply. Filled in client-side.
    #[serde(skip)]
    pub history: Vec<Message>,
}

impl ChatCompletionResult {
    /// Content of the first choice, or empty.
    pub fn text(&self) -> &str {
        self.choices
            .first()
            .map(|c| c.message.content.as_str())
            .unwrap_or_default()
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    /// The conversation so far as a prompt, for the next turn.
    pub fn history_prompt(&self) -> Option<PromptTemplate> {
        if self.history.is_empty() {
            None
        } else {
            Some(PromptTemplate::from_messages(self.history.iter().cloned()))
        }
    }
}

impl fmt::Display for ChatCompletionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChatCompletionErrorDetail {
    pub msg: String,
}

/// Body of a non-200 completion response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChatCompletionError {
    pub detail: Vec<ChatCompletionErrorDetail>,
}

impl fmt::Display for ChatCompletionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.detail.first() {
            Some(detail) => f.write_str(&detail.msg),
            None => f.write_str("unknown error"),
        }
    }
}

/// Error handler for streamed completion frames.
pub fn chat_completion_error_handler(result: &ChatCompletionResult) -> Option<String> {
    if result.is_success() {
        None
    } else {
        Some(format!(
            "chat completion failed: [{}]{}",
            result.status, result.msg
        ))
    }
}
