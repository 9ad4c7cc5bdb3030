//! Completion endpoints on [`FengchaoClient`].

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info};

use super::options::{CompletionOptions, Mode};
use super::result::{chat_completion_error_handler, ChatCompletionResult};
use crate::client::{error_from_response, send_error, FengchaoClient};
use crate::prompt::{Message, Prompt};
use crate::stream::{response_lines, EventStream, FrameStream};
use crate::{ChatClient, ClientError};

const STREAM_PATH: &str = "/chat/";

impl FengchaoClient {
    /// Render `prompt` into `options` and run a non-streaming completion.
    ///
    /// The result's `history` holds the rendered prompt followed by the
    /// assistant reply.
    pub async fn chat_completion(
        &self,
        prompt: Option<&dyn Prompt>,
        mut options: CompletionOptions,
    ) -> Result<ChatCompletionResult, ClientError> {
        options.mode = Some(Mode::Invoke);
        let rendered = match prompt {
            Some(prompt) => options.apply_prompt(prompt)?,
            None => Vec::new(),
        };

        let model = self.find_model(&options.model).await?;
        let mut result = self.invoke(model.chat_path(), &options).await?;

        let reply = Message::assistant(result.text());
        result.history = rendered;
        result.history.push(reply);
        Ok(result)
    }

    /// Completion against a predefined server-side prompt. Needs both the
    /// prompt name and a query.
    pub async fn quick_completion(
        &self,
        mut options: CompletionOptions,
    ) -> Result<ChatCompletionResult, ClientError> {
        let has_prompt = options
            .predefined_prompt
            .as_deref()
            .is_some_and(|p| !p.is_empty());
        if !has_prompt || options.query.is_empty() {
            return Err(ClientError::InvalidOption("prompt or query is empty".into()));
        }
        options.mode = Some(Mode::Invoke);

        let model = self.find_model(&options.model).await?;
        self.invoke(model.chat_path(), &options).await
    }

    async fn invoke(
        &self,
        path: &str,
        options: &CompletionOptions,
    ) -> Result<ChatCompletionResult, ClientError> {
        let token = self.auth_token().await?;

        debug!(
            model = %options.model,
            request_id = %options.request_id,
            path,
            "chat completion request"
        );

        let response = self
            .http
            .post(self.url(path))
            .header(AUTHORIZATION, token)
            .json(options)
            .timeout(options.effective_timeout(self.completion_timeout()))
            .send()
            .await
            .map_err(send_error)?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let result: ChatCompletionResult = response.json().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Timeout
            } else {
                ClientError::ParseError(e.to_string())
            }
        })?;
        if !result.is_success() {
            return Err(ClientError::Completion(format!(
                "error[{}]: {}",
                result.status, result.msg
            )));
        }

        info!(
            request_id = %options.request_id,
            total_tokens = result.usage.total_tokens,
            "chat completion finished"
        );
        Ok(result)
    }

    /// Start a streaming completion and return the pull-mode decoder.
    ///
    /// Non-success responses fail here, before any frame is decoded. With
    /// an explicit timeout the same deadline bounds every read.
    pub async fn chat_completion_stream(
        &self,
        prompt: Option<&dyn Prompt>,
        mut options: CompletionOptions,
    ) -> Result<EventStream<ChatCompletionResult>, ClientError> {
        options.mode = Some(Mode::Stream);
        if let Some(prompt) = prompt {
            options.apply_prompt(prompt)?;
        }

        let token = self.auth_token().await?;
        let deadline = options.timeout.map(|t| Instant::now() + t);

        debug!(
            model = %options.model,
            request_id = %options.request_id,
            "chat completion stream request"
        );

        let request = self
            .http
            .post(self.url(STREAM_PATH))
            .header(AUTHORIZATION, token)
            .json(&options)
            .send();
        let response = match deadline {
            Some(deadline) => timeout_at(deadline, request)
                .await
                .map_err(|_| ClientError::Timeout)?,
            None => request.await,
        }
        .map_err(send_error)?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let source = response_lines(response, self.line_capacity);
        let stream = EventStream::new(source, chat_completion_error_handler);
        Ok(match deadline {
            Some(deadline) => stream.with_deadline(deadline),
            None => stream,
        })
    }

    /// Like [`chat_completion_stream`](Self::chat_completion_stream), but
    /// frames are pushed through a `futures` stream.
    pub async fn chat_completion_stream_simple(
        &self,
        prompt: Option<&dyn Prompt>,
        options: CompletionOptions,
    ) -> Result<FrameStream<ChatCompletionResult>, ClientError> {
        Ok(self
            .chat_completion_stream(prompt, options)
            .await?
            .into_stream())
    }
}

#[async_trait]
impl ChatClient for FengchaoClient {
    async fn complete(
        &self,
        prompt: Option<&dyn Prompt>,
        options: CompletionOptions,
    ) -> Result<ChatCompletionResult, ClientError> {
        self.chat_completion(prompt, options).await
    }

    async fn complete_streaming(
        &self,
        prompt: Option<&dyn Prompt>,
        options: CompletionOptions,
    ) -> Result<FrameStream<ChatCompletionResult>, ClientError> {
        self.chat_completion_stream_simple(prompt, options).await
    }
}
