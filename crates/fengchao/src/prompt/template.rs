//! Composable prompts.

use serde_json::Value;

use super::message::{Message, MessageTemplate};
use super::PromptError;

/// Anything that renders to an ordered list of chat messages.
pub trait Prompt: Send + Sync {
    fn render_messages(&self, variables: &Value) -> Result<Vec<Message>, PromptError>;

    /// Render to JSON text.
    fn render(&self, variables: &Value) -> Result<String, PromptError> {
        let messages = self.render_messages(variables)?;
        Ok(serde_json::to_string(&messages)?)
    }
}

impl Prompt for Message {
    fn render_messages(&self, _variables: &Value) -> Result<Vec<Message>, PromptError> {
        Ok(vec![self.clone()])
    }
}

impl Prompt for MessageTemplate {
    fn render_messages(&self, variables: &Value) -> Result<Vec<Message>, PromptError> {
        Ok(vec![self.render(variables)])
    }
}

/// One element of a [`PromptTemplate`].
#[derive(Debug, Clone, PartialEq)]
pub enum PromptPart {
    Message(Message),
    Template(MessageTemplate),
    Nested(PromptTemplate),
}

impl From<Message> for PromptPart {
    fn from(value: Message) -> Self {
        Self::Message(value)
    }
}

impl From<MessageTemplate> for PromptPart {
    fn from(value: MessageTemplate) -> Self {
        Self::Template(value)
    }
}

impl From<PromptTemplate> for PromptPart {
    fn from(value: PromptTemplate) -> Self {
        Self::Nested(value)
    }
}

impl Prompt for PromptPart {
    fn render_messages(&self, variables: &Value) -> Result<Vec<Message>, PromptError> {
        match self {
            Self::Message(m) => m.render_messages(variables),
            Self::Template(t) => t.render_messages(variables),
            Self::Nested(p) => p.render_messages(variables),
        }
    }
}

/// Ordered list of prompt parts, flattened in order when rendered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptTemplate {
    parts: Vec<PromptPart>,
    /// Pretty-print [`Prompt::render`] output.
    pub human_friendly: bool,
}

impl PromptTemplate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_messages(messages: impl IntoIterator<Item = Message>) -> Self {
        Self {
            parts: messages.into_iter().map(PromptPart::Message).collect(),
            human_friendly: false,
        }
    }

    pub fn with(mut self, part: impl Into<PromptPart>) -> Self {
        self.parts.push(part.into());
        self
    }

    pub fn push(&mut self, part: impl Into<PromptPart>) {
        self.parts.push(part.into());
    }

    pub fn human_friendly(mut self, enabled: bool) -> Self {
        self.human_friendly = enabled;
        self
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn parts(&self) -> &[PromptPart] {
        &self.parts
    }
}

impl Prompt for PromptTemplate {
    fn render_messages(&self, variables: &Value) -> Result<Vec<Message>, PromptError> {
        if self.parts.is_empty() {
            return Err(PromptError::EmptyTemplate);
        }
        let mut messages = Vec::with_capacity(self.parts.len());
        for part in &self.parts {
            messages.extend(part.render_messages(variables)?);
        }
        Ok(messages)
    }

    fn render(&self, variables: &Value) -> Result<String, PromptError> {
        let messages = self.render_messages(variables)?;
        let text = if self.human_friendly {
            serde_json::to_string_pretty(&messages)?
        } else {
            serde_json::to_string(&messages)?
        };
        Ok(text)
    }
}
