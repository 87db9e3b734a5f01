use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use thiserror::Error;

use crate::core::config::Settings;
use crate::models::{ExamId, SubmissionKind};
use crate::schemas::exam::ExamStartResponse;
use crate::schemas::submission::SubmissionRequest;


#[derive(Debug, Error)]
pub enum ResultsApiError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("invalid response from {endpoint}: {reason}")]
    InvalidResponse { endpoint: String, reason: String },
}

impl ResultsApiError {
    /// Text suitable for the user, when the server sent one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ResultsApiError::Rejected { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// Server acknowledgement of a submit or exit call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmitAck {
    pub message: Option<String>,
}

/// The server-side Results API as seen by an exam session.
#[async_trait]
pub trait ResultsApi: Send + Sync {
    async fn start_exam(&self, exam_id: ExamId) -> Result<ExamStartResponse, ResultsApiError>;

    async fn submit_exam(
        &self,
        exam_id: ExamId,
        request: &SubmissionRequest,
    ) -> Result<SubmitAck, ResultsApiError>;

    async fn exit_exam(
        &self,
        exam_id: ExamId,
        request: &SubmissionRequest,
    ) -> Result<SubmitAck, ResultsApiError>;
}

#[derive(Debug, Clone)]
pub struct HttpResultsApi {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpResultsApi {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api = settings.api();
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(api.connect_timeout_seconds))
            .timeout(Duration::from_secs(api.request_timeout_seconds))
            .build()
            .context("Failed to build Results API client")?;

        Ok(Self::with_client(client, &api.base_url, Some(api.auth_token.clone())))
    }

    pub fn with_client(client: Client, base_url: &str, auth_token: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token: auth_token.filter(|token| !token.is_empty()),
        }
    }

    fn exam_endpoint(&self, exam_id: ExamId, action: &str) -> String {
        format!("{}/results/exam/{}/{}", self.base_url, exam_id, action)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn post_submission(
        &self,
        endpoint: String,
        request: &SubmissionRequest,
    ) -> Result<SubmitAck, ResultsApiError> {
        let response = self
            .authorize(self.client.post(&endpoint).json(request))
            .send()
            .await
            .map_err(|source| ResultsApiError::Transport { endpoint: endpoint.clone(), source })?;

        let body = read_json(&endpoint, response).await?;
        let message = body.get("message").and_then(Value::as_str).map(ToString::to_string);
        Ok(SubmitAck { message })
    }
}

#[async_trait]
impl ResultsApi for HttpResultsApi {
    async fn start_exam(&self, exam_id: ExamId) -> Result<ExamStartResponse, ResultsApiError> {
        let endpoint = self.exam_endpoint(exam_id, "start");
        let response = self
            .authorize(self.client.get(&endpoint))
            .send()
            .await
            .map_err(|source| ResultsApiError::Transport { endpoint: endpoint.clone(), source })?;

        let body = read_json(&endpoint, response).await?;
        serde_json::from_value(body)
            .map_err(|err| ResultsApiError::InvalidResponse { endpoint, reason: err.to_string() })
    }

    async fn submit_exam(
        &self,
        exam_id: ExamId,
        request: &SubmissionRequest,
    ) -> Result<SubmitAck, ResultsApiError> {
        let endpoint = self.exam_endpoint(exam_id, SubmissionKind::Full.endpoint());
        self.post_submission(endpoint, request).await
    }

    async fn exit_exam(
        &self,
        exam_id: ExamId,
        request: &SubmissionRequest,
    ) -> Result<SubmitAck, ResultsApiError> {
        let endpoint = self.exam_endpoint(exam_id, SubmissionKind::Partial.endpoint());
        self.post_submission(endpoint, request).await
    }
}

async fn read_json(endpoint: &str, response: Response) -> Result<Value, ResultsApiError> {
    let status = response.status();
    let raw_body = response.text().await.map_err(|source| ResultsApiError::Transport {
        endpoint: endpoint.to_string(),
        source,
    })?;

    let parsed = if raw_body.trim().is_empty() {
        Value::Null
    } else {
        match serde_json::from_str::<Value>(&raw_body) {
            Ok(value) => value,
            Err(_) if !status.is_success() => Value::String(raw_body.clone()),
            Err(err) => {
                return Err(ResultsApiError::InvalidResponse {
                    endpoint: endpoint.to_string(),
                    reason: format!("non-JSON body (status {status}): {err}"),
                })
            }
        }
    };

    if !status.is_success() {
        return Err(ResultsApiError::Rejected {
            status: status.as_u16(),
            message: extract_error_message(&parsed)
                .unwrap_or_else(|| format!("request failed with status {status}")),
        });
    }

    Ok(parsed)
}

fn extract_error_message(payload: &Value) -> Option<String> {
    if let Some(text) = payload.as_str() {
        let trimmed = text.trim();
        return (!trimmed.is_empty()).then(|| trimmed.to_string());
    }

    if let Some(detail) = payload.get("detail") {
        if let Some(text) = detail.as_str() {
            return Some(text.to_string());
        }
        if let Some(items) = detail.as_array() {
            let joined = items
                .iter()
                .filter_map(|item| {
                    item.get("msg")
                        .and_then(Value::as_str)
                        .or_else(|| item.get("message").and_then(Value::as_str))
                })
                .collect::<Vec<_>>()
                .join("; ");
            if !joined.is_empty() {
                return Some(joined);
            }
        }
    }

    payload
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| payload.get("error").and_then(Value::as_str))
        .map(ToString::to_string)
}
