//! Access token retrieval and caching.

use std::time::Duration;

use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::{error_from_response, send_error, FengchaoClient};
use crate::ClientError;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    status: i64,
    #[serde(default)]
    token: String,
    #[serde(default)]
    msg: String,
}

#[derive(Debug, Clone)]
struct AuthToken {
    access_token: String,
    expires_at: Instant,
}

impl AuthToken {
    fn is_fresh(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

pub(crate) struct TokenCache {
    current: Mutex<Option<AuthToken>>,
    ttl: Duration,
}

impl TokenCache {
    pub(crate) fn new(ttl: Duration) -> Self {
        Self {
            current: Mutex::new(None),
            ttl,
        }
    }
}

impl FengchaoClient {
    /// A valid access token, fetching a new one when the cached token has
    /// expired. Concurrent callers share a single refresh.
    pub async fn auth_token(&self) -> Result<String, ClientError> {
        let mut current = self.tokens.current.lock().await;
        if let Some(token) = current.as_ref().filter(|t| t.is_fresh()) {
            return Ok(token.access_token.clone());
        }

        let token = self.fetch_token().await?;
        let access_token = token.access_token.clone();
        *current = Some(token);
        Ok(access_token)
    }

    /// Drop the cached token so the next call re-authenticates.
    pub async fn invalidate_token(&self) {
        self.tokens.current.lock().await.take();
    }

    async fn fetch_token(&self) -> Result<AuthToken, ClientError> {
        debug!("refreshing FengChao access token");

        let response = self
            .http
            .get(self.url("/token"))
            .query(&[
                ("api_key", self.service.api_key.as_str()),
                ("secret_key", self.service.secret_key.as_str()),
            ])
            .timeout(self.basic_timeout())
            .send()
            .await
            .map_err(send_error)?;

        if !response.status().is_success() {
            let err = error_from_response(response).await;
            warn!(error = %err, "token request rejected");
            return Err(ClientError::Auth(err.to_string()));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(e.to_string()))?;
        if body.status != 200 {
            return Err(ClientError::Auth(format!("[{}]{}", body.status, body.msg)));
        }

        Ok(AuthToken {
            access_token: body.token,
            expires_at: Instant::now() + self.tokens.ttl,
        })
    }
}
