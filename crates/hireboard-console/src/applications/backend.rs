use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::domain::{ApplicationId, ApplicationRecord, ApplicationStatus};
use super::filters::FilterCriteria;
use super::pagination::{PageState, SortSpec};
use super::records::ServerStats;

/// Parameters of the paginated list endpoint. Filter fields are omitted when empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    pub page: u32,
    pub limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<String>,
}

impl ListQuery {
    pub fn from_state(filters: &FilterCriteria, sort: SortSpec, page: PageState) -> Self {
        Self {
            page: page.page(),
            limit: page.limit(),
            sort: Some(sort.to_param()),
            search: filters.search().map(str::to_string),
            job_id: filters
                .job_id
                .as_ref()
                .map(|id| id.as_str().trim())
                .filter(|id| !id.is_empty())
                .map(str::to_string),
            status: filters
                .status
                .as_ref()
                .map(|status| status.as_str().trim())
                .filter(|status| !status.is_empty())
                .map(str::to_string),
            date_range: filters
                .date_range
                .as_ref()
                .map(|range| range.as_str().trim())
                .filter(|range| !range.is_empty())
                .map(str::to_string),
        }
    }

    /// Query pairs in wire order, for HTTP transports.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];
        let optional = [
            ("sort", &self.sort),
            ("search", &self.search),
            ("job_id", &self.job_id),
            ("status", &self.status),
            ("date_range", &self.date_range),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                pairs.push((key, value.clone()));
            }
        }
        pairs
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResponse {
    pub records: Vec<ApplicationRecord>,
    pub total: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<ServerStats>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: ApplicationStatus,
}

/// Single update acknowledgment; servers may echo the updated record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdateResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<ApplicationRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkStatusRequest {
    pub ids: Vec<ApplicationId>,
    pub status: ApplicationStatus,
}

/// Bulk update acknowledgment. `failed` lists ids the server did not update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkUpdateAck {
    pub updated: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<ApplicationId>,
}

/// Contract with the employer applications API.
#[async_trait]
pub trait ApplicationsBackend: Send + Sync {
    async fn list(&self, query: &ListQuery) -> Result<ListResponse, BackendError>;

    async fn update_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<StatusUpdateResponse, BackendError>;

    async fn bulk_update_status(
        &self,
        ids: &[ApplicationId],
        status: ApplicationStatus,
    ) -> Result<BulkUpdateAck, BackendError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("backend request failed: {0}")]
    Transport(String),
    #[error("backend responded with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("backend rejected the request: {0}")]
    Rejected(String),
    #[error("application {0} not found")]
    NotFound(ApplicationId),
    #[error("backend response was malformed: {0}")]
    Malformed(String),
}
