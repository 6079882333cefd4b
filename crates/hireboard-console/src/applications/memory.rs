use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use super::backend::{
    ApplicationsBackend, BackendError, BulkUpdateAck, ListQuery, ListResponse,
    StatusUpdateResponse,
};
use super::domain::{
    ApplicationId, ApplicationRecord, ApplicationStatus, DateRange, SortDirection, SortKey,
};
use super::pagination::SortSpec;
use super::records::ServerStats;

/// Backend implementation over an in-process record list. It validates the query the way
/// the production API does, so unknown statuses, date ranges, or sort fields are rejected.
#[derive(Clone)]
pub struct InMemoryApplicationsBackend {
    records: Arc<Mutex<Vec<ApplicationRecord>>>,
    include_stats: bool,
    reference_time: Option<DateTime<Utc>>,
}

impl Default for InMemoryApplicationsBackend {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl InMemoryApplicationsBackend {
    pub fn new(records: Vec<ApplicationRecord>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
            include_stats: true,
            reference_time: None,
        }
    }

    /// Omit the aggregate summary from list responses.
    pub fn without_stats(mut self) -> Self {
        self.include_stats = false;
        self
    }

    /// Pin "now" for date-range filtering.
    pub fn with_reference_time(mut self, now: DateTime<Utc>) -> Self {
        self.reference_time = Some(now);
        self
    }

    pub fn insert(&self, record: ApplicationRecord) {
        self.lock().push(record);
    }

    pub fn remove(&self, id: &ApplicationId) -> Option<ApplicationRecord> {
        let mut guard = self.lock();
        let index = guard.iter().position(|record| &record.id == id)?;
        Some(guard.remove(index))
    }

    pub fn fetch(&self, id: &ApplicationId) -> Option<ApplicationRecord> {
        self.lock().iter().find(|record| &record.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ApplicationRecord>> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn matcher(&self, query: &ListQuery) -> Result<Matcher, BackendError> {
        let status = query
            .status
            .as_deref()
            .map(|raw| {
                raw.parse::<ApplicationStatus>()
                    .map_err(|error| BackendError::Rejected(error.to_string()))
            })
            .transpose()?;

        let earliest = query
            .date_range
            .as_deref()
            .map(|raw| {
                DateRange::parse(raw)
                    .days()
                    .map(|days| self.now() - Duration::days(days))
                    .ok_or_else(|| BackendError::Rejected(format!("unknown date range '{raw}'")))
            })
            .transpose()?;

        Ok(Matcher {
            search: query.search.as_deref().map(str::to_lowercase),
            job_id: query.job_id.clone(),
            status,
            earliest,
        })
    }

    fn now(&self) -> DateTime<Utc> {
        self.reference_time.unwrap_or_else(Utc::now)
    }
}

struct Matcher {
    search: Option<String>,
    job_id: Option<String>,
    status: Option<ApplicationStatus>,
    earliest: Option<DateTime<Utc>>,
}

impl Matcher {
    fn matches(&self, record: &ApplicationRecord) -> bool {
        if let Some(status) = self.status {
            if record.status != status {
                return false;
            }
        }
        if let Some(job_id) = &self.job_id {
            if record.job_id.as_ref().map(|id| id.as_str()) != Some(job_id.as_str()) {
                return false;
            }
        }
        if let Some(earliest) = self.earliest {
            if record.applied_at < earliest {
                return false;
            }
        }
        match &self.search {
            Some(needle) => {
                record.applicant_name.to_lowercase().contains(needle)
                    || record.applicant_email.to_lowercase().contains(needle)
                    || record.job_title.to_lowercase().contains(needle)
                    || record
                        .skills
                        .iter()
                        .any(|skill| skill.to_lowercase().contains(needle))
            }
            None => true,
        }
    }
}

fn compare(a: &ApplicationRecord, b: &ApplicationRecord, key: SortKey) -> Ordering {
    match key {
        SortKey::AppliedAt => a.applied_at.cmp(&b.applied_at),
        SortKey::ApplicantName => a
            .applicant_name
            .to_lowercase()
            .cmp(&b.applicant_name.to_lowercase()),
        SortKey::JobTitle => a.job_title.to_lowercase().cmp(&b.job_title.to_lowercase()),
        SortKey::Status => a.status.cmp(&b.status),
    }
}

#[async_trait]
impl ApplicationsBackend for InMemoryApplicationsBackend {
    async fn list(&self, query: &ListQuery) -> Result<ListResponse, BackendError> {
        if query.page == 0 || query.limit == 0 {
            return Err(BackendError::Rejected(
                "page and limit must be positive".to_string(),
            ));
        }
        let sort = match query.sort.as_deref() {
            Some(raw) => raw
                .parse::<SortSpec>()
                .map_err(|error| BackendError::Rejected(error.to_string()))?,
            None => SortSpec::default(),
        };
        let matcher = self.matcher(query)?;

        let mut matched: Vec<ApplicationRecord> = self
            .lock()
            .iter()
            .filter(|record| matcher.matches(record))
            .cloned()
            .collect();

        matched.sort_by(|a, b| {
            let ordering = compare(a, b, sort.key).then_with(|| a.id.cmp(&b.id));
            match sort.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });

        let total = matched.len() as u64;
        let stats = self.include_stats.then(|| {
            let mut by_status = BTreeMap::new();
            for record in &matched {
                *by_status
                    .entry(record.status.label().to_string())
                    .or_insert(0) += 1;
            }
            ServerStats { total, by_status }
        });

        let offset = (query.page as usize - 1).saturating_mul(query.limit as usize);
        let records = matched
            .into_iter()
            .skip(offset)
            .take(query.limit as usize)
            .collect();

        Ok(ListResponse {
            records,
            total,
            stats,
        })
    }

    async fn update_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<StatusUpdateResponse, BackendError> {
        let mut guard = self.lock();
        let record = guard
            .iter_mut()
            .find(|record| &record.id == id)
            .ok_or_else(|| BackendError::NotFound(id.clone()))?;
        record.status = status;
        Ok(StatusUpdateResponse {
            record: Some(record.clone()),
        })
    }

    async fn bulk_update_status(
        &self,
        ids: &[ApplicationId],
        status: ApplicationStatus,
    ) -> Result<BulkUpdateAck, BackendError> {
        let mut guard = self.lock();
        let mut ack = BulkUpdateAck::default();
        for id in ids {
            match guard.iter_mut().find(|record| &record.id == id) {
                Some(record) => {
                    record.status = status;
                    ack.updated += 1;
                }
                None => ack.failed.push(id.clone()),
            }
        }
        Ok(ack)
    }
}
