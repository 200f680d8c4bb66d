//! REST client for a RunPod-style serverless face-swap endpoint.
//!
//! Submission is `POST <endpoint>/run` with a bearer token and a body of
//! `{ "input": { source_image_url, target_image_url, unique_id } }`.
//! Status lives at the same endpoint root: `GET <endpoint>/status/{job_id}`.

use std::time::Duration;

use async_trait::async_trait;
use faceframe_core::config::require_env;
use faceframe_core::error::CoreError;
use faceframe_core::job::{JobId, JobRequest, JobStatus};
use faceframe_core::services::{JobClient, JobClientError};
use serde::{Deserialize, Serialize};

/// Per-request timeout for submission and status calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Path suffixes stripped from the submission URL to find the endpoint root.
const SUBMIT_SUFFIXES: [&str; 2] = ["/runsync", "/run"];

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Connection settings for the compute endpoint.
#[derive(Debug, Clone)]
pub struct RunPodConfig {
    /// Full submission URL, e.g. `https://api.runpod.ai/v2/<endpoint>/run`.
    pub run_url: String,
    pub api_key: String,
}

impl RunPodConfig {
    /// Load from `RUNPOD_FACESWAP_URL` and `RUNPOD_API_KEY` (both required).
    pub fn from_env() -> Result<Self, CoreError> {
        Ok(Self {
            run_url: require_env("RUNPOD_FACESWAP_URL")?,
            api_key: require_env("RUNPOD_API_KEY")?,
        })
    }
}

/// Derive the status URL for `job_id` from the submission URL.
pub fn status_url(run_url: &str, job_id: &JobId) -> String {
    let trimmed = run_url.trim_end_matches('/');
    let root = SUBMIT_SUFFIXES
        .iter()
        .find_map(|suffix| trimmed.strip_suffix(suffix))
        .unwrap_or(trimmed);
    format!("{root}/status/{job_id}")
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct SubmitBody<'a> {
    input: &'a JobRequest,
}

/// Response to a submission. Only `id` matters to us.
#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
    pub id: Option<String>,
    pub status: Option<String>,
}

/// Response to a status query.
#[derive(Debug, Deserialize)]
pub struct StatusResponse {
    pub id: Option<String>,
    pub status: String,
}

impl SubmitResponse {
    fn into_job_id(self) -> Result<JobId, JobClientError> {
        match self.id {
            Some(id) if !id.trim().is_empty() => Ok(JobId::new(id)),
            _ => Err(JobClientError::MissingJobId),
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client for one face-swap endpoint.
pub struct RunPodClient {
    client: reqwest::Client,
    config: RunPodConfig,
}

impl RunPodClient {
    pub fn new(config: RunPodConfig) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CoreError::Internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Reuse an existing [`reqwest::Client`] (shares its connection pool).
    pub fn with_client(client: reqwest::Client, config: RunPodConfig) -> Self {
        Self { client, config }
    }

    pub fn run_url(&self) -> &str {
        &self.config.run_url
    }

    // ---- private helpers ----

    /// Turn a non-2xx response into [`JobClientError::Api`].
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, JobClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(JobClientError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, JobClientError> {
        let response = Self::ensure_success(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| JobClientError::Request(e.to_string()))
    }
}

#[async_trait]
impl JobClient for RunPodClient {
    async fn submit(&self, request: &JobRequest) -> Result<JobId, JobClientError> {
        let response = self
            .client
            .post(&self.config.run_url)
            .bearer_auth(&self.config.api_key)
            .json(&SubmitBody { input: request })
            .send()
            .await
            .map_err(|e| JobClientError::Request(e.to_string()))?;

        let parsed: SubmitResponse = Self::parse_response(response).await?;
        let provider_status = parsed.status.clone();
        let job_id = parsed.into_job_id()?;

        tracing::info!(
            session_id = %request.unique_id,
            job_id = %job_id,
            provider_status = provider_status.as_deref().unwrap_or("unknown"),
            "Face-swap job submitted",
        );
        Ok(job_id)
    }

    async fn status(&self, job_id: &JobId) -> Result<JobStatus, JobClientError> {
        let response = self
            .client
            .get(status_url(&self.config.run_url, job_id))
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(|e| JobClientError::Request(e.to_string()))?;

        let parsed: StatusResponse = Self::parse_response(response).await?;
        JobStatus::from_token(&parsed.status)
            .ok_or(JobClientError::UnexpectedStatus(parsed.status))
    }
}
