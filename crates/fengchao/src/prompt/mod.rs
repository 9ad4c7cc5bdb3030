//! Prompt building: messages, `{{.Name}}` templates and composition.

pub mod message;
pub mod template;

pub use message::{Message, MessageTemplate, Role};
pub use template::{Prompt, PromptPart, PromptTemplate};

#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    #[error("prompt template is empty")]
    EmptyTemplate,

    #[error("user messages is empty")]
    NoUserMessages,

    #[error("last message must be user role message, got {0}")]
    LastNotUser(Role),

    #[error("template error: {0}")]
    Template(String),

    #[error("failed to serialize prompt: {0}")]
    Serialize(#[from] serde_json::Error),
}
