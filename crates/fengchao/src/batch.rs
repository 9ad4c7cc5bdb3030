//! Concurrent fan-out of independent completion requests.

use std::collections::HashMap;

use futures_util::future::join_all;
use tracing::{debug, warn};

use crate::client::FengchaoClient;
use crate::completion::{ChatCompletionResult, CompletionOptions};
use crate::prompt::{Prompt, PromptTemplate};
use crate::ClientError;

/// Maximum number of requests in one batch.
pub const BATCH_MAX_SIZE: usize = 5;

/// Handle returned by [`BatchBuilder::add`], used to look up the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BatchKey(usize);

impl BatchKey {
    pub fn index(&self) -> usize {
        self.0
    }
}

struct BatchEntry {
    key: BatchKey,
    prompt: Option<PromptTemplate>,
    options: CompletionOptions,
}

#[derive(Default)]
pub struct BatchBuilder {
    entries: Vec<BatchEntry>,
}

impl BatchBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(
        &mut self,
        prompt: Option<PromptTemplate>,
        options: CompletionOptions,
    ) -> Result<BatchKey, ClientError> {
        if self.entries.len() >= BATCH_MAX_SIZE {
            return Err(ClientError::BatchFull(BATCH_MAX_SIZE));
        }
        let key = BatchKey(self.entries.len());
        self.entries.push(BatchEntry {
            key,
            prompt,
            options,
        });
        Ok(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Per-request results of a batch. `complete` is false if any request failed.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub completions: HashMap<BatchKey, ChatCompletionResult>,
    pub errors: HashMap<BatchKey, ClientError>,
    pub complete: bool,
}

impl FengchaoClient {
    /// Run every request in `batch` concurrently and wait for all of them.
    pub async fn batch_chat_completion(&self, batch: BatchBuilder) -> BatchOutcome {
        debug!(size = batch.len(), "batch chat completion");

        let requests = batch.entries.into_iter().map(|entry| async move {
            let prompt = entry.prompt.as_ref().map(|p| p as &dyn Prompt);
            let result = self.chat_completion(prompt, entry.options).await;
            (entry.key, result)
        });

        let mut outcome = BatchOutcome {
            complete: true,
            ..BatchOutcome::default()
        };
        for (key, result) in join_all(requests).await {
            match result {
                Ok(completion) => {
                    outcome.completions.insert(key, completion);
                }
                Err(err) => {
                    warn!(entry = key.index(), error = %err, "batch entry failed");
                    outcome.errors.insert(key, err);
                    outcome.complete = false;
                }
            }
        }
        outcome
    }
}
