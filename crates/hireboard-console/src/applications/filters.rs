use super::domain::{DateRange, JobId, StatusFilter};

/// Criteria narrowing the application list. Every field is optional and the default
/// value matches all applications.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub search_text: String,
    pub job_id: Option<JobId>,
    pub status: Option<StatusFilter>,
    pub date_range: Option<DateRange>,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.search_text.trim().is_empty()
            && self.job_id.is_none()
            && self.status.is_none()
            && self.date_range.is_none()
    }

    /// Search text with surrounding whitespace removed, or `None` when blank.
    pub fn search(&self) -> Option<&str> {
        let trimmed = self.search_text.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

/// Partial update applied by [`FilterStore::set_filter`]. Fields left as `None` keep their
/// current value; `Some(None)` clears an optional criterion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPatch {
    pub search_text: Option<String>,
    pub job_id: Option<Option<JobId>>,
    pub status: Option<Option<StatusFilter>>,
    pub date_range: Option<Option<DateRange>>,
}

impl FilterPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search_text = Some(text.into());
        self
    }

    pub fn job(mut self, job_id: Option<JobId>) -> Self {
        self.job_id = Some(job_id);
        self
    }

    pub fn status(mut self, status: Option<StatusFilter>) -> Self {
        self.status = Some(status);
        self
    }

    pub fn date_range(mut self, range: Option<DateRange>) -> Self {
        self.date_range = Some(range);
        self
    }

    fn apply_to(self, criteria: &mut FilterCriteria) {
        if let Some(text) = self.search_text {
            criteria.search_text = text;
        }
        if let Some(job_id) = self.job_id {
            criteria.job_id = job_id.filter(|id| !id.as_str().trim().is_empty());
        }
        if let Some(status) = self.status {
            criteria.status = status;
        }
        if let Some(range) = self.date_range {
            criteria.date_range = range;
        }
    }
}

/// Holds the active filter criteria. Every mutation bumps the revision, which the
/// controller treats as a change notification.
#[derive(Debug, Clone, Default)]
pub struct FilterStore {
    criteria: FilterCriteria,
    revision: u64,
}

impl FilterStore {
    pub fn new(criteria: FilterCriteria) -> Self {
        Self {
            criteria,
            revision: 0,
        }
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn set_filter(&mut self, patch: FilterPatch) {
        patch.apply_to(&mut self.criteria);
        self.revision += 1;
    }

    pub fn reset(&mut self) {
        self.criteria = FilterCriteria::default();
        self.revision += 1;
    }

    /// Replace the criteria wholesale, used when hydrating from a URL.
    pub(crate) fn replace(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
        self.revision += 1;
    }
}
