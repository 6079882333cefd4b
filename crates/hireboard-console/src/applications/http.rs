use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Url};
use serde::de::DeserializeOwned;
use tracing::warn;

use super::backend::{
    ApplicationsBackend, BackendError, BulkStatusRequest, BulkUpdateAck, ListQuery, ListResponse,
    StatusUpdateRequest, StatusUpdateResponse,
};
use super::domain::{ApplicationId, ApplicationStatus};
use crate::config::BackendConfig;

pub const APPLICATIONS_PATH: &str = "/api/v1/employer/applications";

/// `reqwest` transport for the employer applications API.
#[derive(Clone)]
pub struct HttpApplicationsBackend {
    base_url: Url,
    client: Client,
}

impl HttpApplicationsBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        if let Some(token) = config.api_token.as_deref() {
            let value = header::HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|error| BackendError::Transport(format!("invalid API token: {error}")))?;
            headers.insert(header::AUTHORIZATION, value);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|error| {
                BackendError::Transport(format!("failed to build HTTP client: {error}"))
            })?;

        let base_url = Url::parse(&config.api_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| {
                BackendError::Transport(format!("invalid API URL '{}'", config.api_url))
            })?;

        Ok(Self { base_url, client })
    }

    /// Appends the collection path and `segments` to the base URL, percent-encoding each
    /// segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .extend(APPLICATIONS_PATH.trim_start_matches('/').split('/'))
                .extend(segments);
        }
        url
    }

    async fn request_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, BackendError> {
        let body = self.request_body(request).await?;
        serde_json::from_str(&body).map_err(|error| BackendError::Malformed(error.to_string()))
    }

    /// Like `request_json`, but a success with no body (such as 204) is an acknowledgment.
    async fn request_ack<T: DeserializeOwned + Default>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, BackendError> {
        let body = self.request_body(request).await?;
        if body.trim().is_empty() {
            return Ok(T::default());
        }
        serde_json::from_str(&body).map_err(|error| BackendError::Malformed(error.to_string()))
    }

    async fn request_body(&self, request: reqwest::RequestBuilder) -> Result<String, BackendError> {
        let response = request
            .send()
            .await
            .map_err(|error| BackendError::Transport(error.to_string()))?;

        let status = response.status();
        let body = response.text().await.map_err(|error| {
            BackendError::Transport(format!("response read failed: {error}"))
        })?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "applications API returned an error");
            return Err(match status.as_u16() {
                400 | 422 => BackendError::Rejected(body),
                code => BackendError::Status { status: code, body },
            });
        }

        Ok(body)
    }
}

#[async_trait]
impl ApplicationsBackend for HttpApplicationsBackend {
    async fn list(&self, query: &ListQuery) -> Result<ListResponse, BackendError> {
        let request = self.client.get(self.endpoint(&[])).query(&query.to_pairs());
        self.request_json(request).await
    }

    async fn update_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<StatusUpdateResponse, BackendError> {
        let request = self
            .client
            .patch(self.endpoint(&[id.as_str(), "status"]))
            .json(&StatusUpdateRequest { status });
        self.request_ack(request).await.map_err(|error| match error {
            BackendError::Status { status: 404, .. } => BackendError::NotFound(id.clone()),
            other => other,
        })
    }

    async fn bulk_update_status(
        &self,
        ids: &[ApplicationId],
        status: ApplicationStatus,
    ) -> Result<BulkUpdateAck, BackendError> {
        let request = self
            .client
            .post(self.endpoint(&["bulk-status"]))
            .json(&BulkStatusRequest {
                ids: ids.to_vec(),
                status,
            });
        self.request_ack(request).await
    }
}
