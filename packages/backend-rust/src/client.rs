use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tokio::time::sleep;
use tracing::debug;

use crate::dto::{ObserveRequest, ObserveResponse, PredictRequest, PredictResponse};

const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const HEALTH_RETRIES: usize = 80;
pub const HEALTH_RETRY_DELAY: Duration = Duration::from_millis(200);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("JSON decode failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("service at {base_url} not healthy after {attempts} attempts")]
    Unavailable { base_url: String, attempts: usize },
}

/// Thin client for a running predictor service
#[derive(Clone)]
pub struct BktClient {
    base_url: String,
    client: reqwest::Client,
}

impl BktClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(DEFAULT_TIMEOUT_MS))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            base_url: base_url.into().trim().trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Poll `/health` until it answers 2xx
    pub async fn wait_for_server(&self, retries: usize, delay: Duration) -> Result<(), ClientError> {
        let url = format!("{}/health", self.base_url);
        for attempt in 1..=retries {
            match self.client.get(&url).send().await {
                Ok(resp) if resp.status().is_success() => return Ok(()),
                Ok(resp) => debug!(attempt, status = %resp.status(), "health check not ready"),
                Err(e) => debug!(attempt, error = %e, "health check failed"),
            }
            if attempt < retries {
                sleep(delay).await;
            }
        }
        Err(ClientError::Unavailable {
            base_url: self.base_url.clone(),
            attempts: retries,
        })
    }

    pub async fn predict(&self, request: &PredictRequest) -> Result<PredictResponse, ClientError> {
        self.post_json("/predict", request).await
    }

    pub async fn observe(&self, request: &ObserveRequest) -> Result<ObserveResponse, ClientError> {
        self.post_json("/observe", request).await
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, ClientError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let resp = self.client.post(&url).json(body).send().await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;
        if !status.is_success() {
            return Err(ClientError::HttpStatus {
                status,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}
