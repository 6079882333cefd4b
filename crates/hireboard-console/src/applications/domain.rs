use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for candidate applications.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub String);

impl ApplicationId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for job postings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Opaque pointer into the resume storage service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResumeRef(pub String);

/// Hiring pipeline stage of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Reviewing,
    Shortlisted,
    Interview,
    Offer,
    Hired,
    Rejected,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 7] = [
        ApplicationStatus::Pending,
        ApplicationStatus::Reviewing,
        ApplicationStatus::Shortlisted,
        ApplicationStatus::Interview,
        ApplicationStatus::Offer,
        ApplicationStatus::Hired,
        ApplicationStatus::Rejected,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Reviewing => "reviewing",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Interview => "interview",
            ApplicationStatus::Offer => "offer",
            ApplicationStatus::Hired => "hired",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    /// Transitions into this status need an explicit confirmation before a bulk action.
    pub const fn is_destructive(self) -> bool {
        matches!(self, ApplicationStatus::Rejected)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown application status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for ApplicationStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        ApplicationStatus::ALL
            .into_iter()
            .find(|status| status.label() == normalized)
            .ok_or_else(|| UnknownStatus(value.to_string()))
    }
}

/// One candidate's application to one job posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: ApplicationId,
    pub applicant_name: String,
    pub applicant_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<JobId>,
    pub job_title: String,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_ref: Option<ResumeRef>,
}

/// Status filter as entered by the user. Values the console does not recognize are kept
/// verbatim so the backend can decide whether they are valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusFilter {
    Known(ApplicationStatus),
    Unrecognized(String),
}

impl StatusFilter {
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<ApplicationStatus>() {
            Ok(status) => StatusFilter::Known(status),
            Err(_) => StatusFilter::Unrecognized(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            StatusFilter::Known(status) => status.label(),
            StatusFilter::Unrecognized(raw) => raw,
        }
    }
}

impl From<ApplicationStatus> for StatusFilter {
    fn from(value: ApplicationStatus) -> Self {
        StatusFilter::Known(value)
    }
}

/// Relative window on `applied_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateRange {
    Last7Days,
    Last30Days,
    Last90Days,
    Unrecognized(String),
}

impl DateRange {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "7d" => DateRange::Last7Days,
            "30d" => DateRange::Last30Days,
            "90d" => DateRange::Last90Days,
            _ => DateRange::Unrecognized(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            DateRange::Last7Days => "7d",
            DateRange::Last30Days => "30d",
            DateRange::Last90Days => "90d",
            DateRange::Unrecognized(raw) => raw,
        }
    }

    pub fn days(&self) -> Option<i64> {
        match self {
            DateRange::Last7Days => Some(7),
            DateRange::Last30Days => Some(30),
            DateRange::Last90Days => Some(90),
            DateRange::Unrecognized(_) => None,
        }
    }
}

/// Fields the list can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    AppliedAt,
    ApplicantName,
    JobTitle,
    Status,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [
        SortKey::AppliedAt,
        SortKey::ApplicantName,
        SortKey::JobTitle,
        SortKey::Status,
    ];

    pub const fn field(self) -> &'static str {
        match self {
            SortKey::AppliedAt => "applied_at",
            SortKey::ApplicantName => "applicant_name",
            SortKey::JobTitle => "job_title",
            SortKey::Status => "status",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub const fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SortParseError {
    #[error("'{0}' is not a sortable field")]
    UnknownField(String),
    #[error("'{0}' is not a sort direction")]
    UnknownDirection(String),
}

impl FromStr for SortKey {
    type Err = SortParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .into_iter()
            .find(|key| key.field() == value.trim())
            .ok_or_else(|| SortParseError::UnknownField(value.to_string()))
    }
}

impl FromStr for SortDirection {
    type Err = SortParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(SortParseError::UnknownDirection(value.to_string())),
        }
    }
}
