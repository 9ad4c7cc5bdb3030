//! Model catalog lookup and caching.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::{error_from_response, send_error, FengchaoClient};
use crate::ClientError;

/// Channel name of models hosted on the service's own hardware.
pub const LOCAL_MODEL_CHANNEL: &str = "本地模型";

const CHAT_PATH: &str = "/chat/";
const LOCAL_CHAT_PATH: &str = "/local_chat/";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Model {
    pub id: String,
    pub owned_by: String,
    pub max_input_token: u64,
    pub max_output_token: u64,
    pub in_price: f64,
    pub out_price: f64,
    pub unit: String,
    #[serde(rename = "mode")]
    pub modes: Vec<String>,
    pub channel: String,
    pub created: String,
}

impl Model {
    pub fn is_local(&self) -> bool {
        self.channel == LOCAL_MODEL_CHANNEL
    }

    /// Endpoint that serves non-streaming completions for this model.
    pub fn chat_path(&self) -> &'static str {
        if self.is_local() {
            LOCAL_CHAT_PATH
        } else {
            CHAT_PATH
        }
    }
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    #[serde(default)]
    data: Vec<Model>,
}

struct Catalog {
    models: Vec<Model>,
    fetched_at: Instant,
}

pub(crate) struct ModelCache {
    catalog: Mutex<Option<Catalog>>,
    ttl: Duration,
}

impl ModelCache {
    pub(crate) fn new(ttl: Duration) -> Self {
        Self {
            catalog: Mutex::new(None),
            ttl,
        }
    }
}

/// The model a request names; for a comma-separated list, the first entry.
pub(crate) fn primary_model_name(name: &str) -> &str {
    name.split(',').next().unwrap_or(name).trim()
}

impl FengchaoClient {
    /// Models the service currently offers, cached for the configured TTL.
    pub async fn available_models(&self) -> Result<Vec<Model>, ClientError> {
        let mut catalog = self.models.catalog.lock().await;
        if let Some(cached) = catalog
            .as_ref()
            .filter(|c| c.fetched_at.elapsed() < self.models.ttl)
        {
            return Ok(cached.models.clone());
        }

        let models = self.fetch_models().await?;
        *catalog = Some(Catalog {
            models: models.clone(),
            fetched_at: Instant::now(),
        });
        Ok(models)
    }

    /// Look up a model by name.
    pub async fn find_model(&self, name: &str) -> Result<Model, ClientError> {
        let models = self.available_models().await?;
        if models.is_empty() {
            return Err(ClientError::NoModels);
        }
        let wanted = primary_model_name(name);
        models
            .into_iter()
            .find(|m| m.id == wanted)
            .ok_or_else(|| ClientError::UnsupportedModel(name.to_string()))
    }

    async fn fetch_models(&self) -> Result<Vec<Model>, ClientError> {
        let response = self
            .http
            .get(self.url("/models/"))
            .timeout(self.basic_timeout())
            .send()
            .await
            .map_err(send_error)?;

        if !response.status().is_success() {
            let err = error_from_response(response).await;
            warn!(error = %err, "model catalog request failed");
            return Err(err);
        }

        let body: ModelsResponse = response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(e.to_string()))?;
        debug!(count = body.data.len(), "loaded model catalog");
        Ok(body.data)
    }
}
