//! Client for the FengChao chat completion service.
//!
//! Provides:
//! - Request/response chat completion with prompt templates
//! - Streaming completion over the service's event stream, in pull or push mode
//! - Token and model-catalog caching
//! - Concurrent batch completion

pub mod batch;
pub mod client;
pub mod completion;
pub mod prompt;
pub mod stream;

use async_trait::async_trait;
use fengchao_common::{ConfigError, FengchaoError};

pub use batch::{BatchBuilder, BatchKey, BatchOutcome, BATCH_MAX_SIZE};
pub use client::{FengchaoClient, Model, LOCAL_MODEL_CHANNEL};
pub use completion::{
    chat_completion_error_handler, ChatCompletionError, ChatCompletionResult, Choice,
    CompletionOptions, Mode, Usage,
};
pub use prompt::{Message, MessageTemplate, Prompt, PromptError, PromptTemplate, Role};
pub use stream::{EventStream, FrameStream, ServerError, StreamError};

/// Completion operations, for callers that want to swap the transport.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(
        &self,
        prompt: Option<&dyn Prompt>,
        options: CompletionOptions,
    ) -> Result<ChatCompletionResult, ClientError>;

    async fn complete_streaming(
        &self,
        prompt: Option<&dyn Prompt>,
        options: CompletionOptions,
    ) -> Result<FrameStream<ChatCompletionResult>, ClientError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("auth error: {0}")]
    Auth(String),
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Rate limited")]
    RateLimited,
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("request timeout")]
    Timeout,
    #[error("chat completion error: {0}")]
    Completion(String),
    #[error("fail to load prompt template: {0}")]
    Prompt(#[from] PromptError),
    #[error("unsupported model ({0})")]
    UnsupportedModel(String),
    #[error("available model is empty, please check service")]
    NoModels,
    #[error("batch is full (max {0} entries)")]
    BatchFull(usize),
    #[error("invalid option: {0}")]
    InvalidOption(String),
    #[error(transparent)]
    Stream(#[from] StreamError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<ClientError> for FengchaoError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Config(e) => FengchaoError::Config(e),
            other => FengchaoError::Client(other.to_string()),
        }
    }
}
