use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use reqwest::Url;

use super::domain::{DateRange, JobId, StatusFilter};
use super::filters::FilterCriteria;
use super::pagination::SortSpec;

/// Recognized query-string keys, in the order they are written.
pub const QUERY_KEYS: [&str; 6] = ["search", "job_id", "status", "date_range", "sort", "page"];

/// Own writes remembered while the host has not reported them back yet.
const MAX_PENDING_SELF_WRITES: usize = 16;

/// The slice of list state persisted in the address bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlState {
    pub filters: FilterCriteria,
    pub sort: SortSpec,
    pub page: u32,
}

impl Default for UrlState {
    fn default() -> Self {
        Self {
            filters: FilterCriteria::default(),
            sort: SortSpec::default(),
            page: 1,
        }
    }
}

impl UrlState {
    /// Non-default fields only, in [`QUERY_KEYS`] order.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = self.filters.search() {
            pairs.push(("search", search.to_string()));
        }
        if let Some(job_id) = &self.filters.job_id {
            pairs.push(("job_id", job_id.as_str().to_string()));
        }
        if let Some(status) = &self.filters.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        if let Some(range) = &self.filters.date_range {
            pairs.push(("date_range", range.as_str().to_string()));
        }
        if !self.sort.is_default() {
            pairs.push(("sort", self.sort.to_param()));
        }
        if self.page > 1 {
            pairs.push(("page", self.page.to_string()));
        }
        pairs
    }

    /// Missing, blank, or unparseable values fall back to their defaults; unknown keys are
    /// ignored. Status and date-range values are kept even when unrecognized.
    pub fn from_query_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut state = UrlState::default();
        for (key, value) in pairs {
            let value = value.as_ref().trim();
            match key.as_ref() {
                "search" => state.filters.search_text = value.to_string(),
                "job_id" => {
                    state.filters.job_id = (!value.is_empty()).then(|| JobId::new(value));
                }
                "status" => {
                    state.filters.status =
                        (!value.is_empty()).then(|| StatusFilter::parse(value));
                }
                "date_range" => {
                    state.filters.date_range =
                        (!value.is_empty()).then(|| DateRange::parse(value));
                }
                "sort" => state.sort = value.parse().unwrap_or_default(),
                "page" => {
                    state.page = value
                        .parse::<u32>()
                        .ok()
                        .filter(|page| *page >= 1)
                        .unwrap_or(1);
                }
                _ => {}
            }
        }
        state
    }

    pub fn from_url(url: &Url) -> Self {
        Self::from_query_pairs(url.query_pairs())
    }

    /// Rewrites the query of `url`, leaving unrelated parts untouched.
    pub fn apply_to_url(&self, url: &mut Url) {
        url.set_query(None);
        let pairs = self.to_query_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
    }
}

/// Host address bar. Writes are replace-style so they never add history entries.
pub trait LocationBar: Send + Sync {
    fn current(&self) -> Url;
    fn replace(&self, url: Url);
}

impl<T: LocationBar + ?Sized> LocationBar for Arc<T> {
    fn current(&self) -> Url {
        (**self).current()
    }

    fn replace(&self, url: Url) {
        (**self).replace(url)
    }
}

/// Result of observing a location change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// The change was our own replace-style write and must not be re-parsed.
    SelfOriginated,
    External(UrlState),
}

/// Mirrors list state into the address bar and parses external navigations back out.
pub struct UrlSynchronizer<L> {
    location: L,
    /// Queries we wrote, oldest first, not yet reported back by the host.
    pending_self_writes: VecDeque<String>,
}

impl<L: LocationBar> UrlSynchronizer<L> {
    pub fn new(location: L) -> Self {
        Self {
            location,
            pending_self_writes: VecDeque::new(),
        }
    }

    pub fn location(&self) -> &L {
        &self.location
    }

    /// Reads the current address; called once on mount before the first fetch.
    pub fn hydrate(&self) -> UrlState {
        UrlState::from_url(&self.location.current())
    }

    /// Writes `state` unless the address already shows it. Returns whether a write happened.
    pub fn write(&mut self, state: &UrlState) -> bool {
        let mut url = self.location.current();
        let before = url.query().unwrap_or_default().to_string();
        state.apply_to_url(&mut url);
        let after = url.query().unwrap_or_default().to_string();
        if before == after {
            return false;
        }
        if self.pending_self_writes.len() == MAX_PENDING_SELF_WRITES {
            self.pending_self_writes.pop_front();
        }
        self.pending_self_writes.push_back(after);
        self.location.replace(url);
        true
    }

    /// Classifies a location change reported by the host. Reports arrive in write order,
    /// so a match also acknowledges every older pending write.
    pub fn observe(&mut self, url: &Url) -> Navigation {
        let query = url.query().unwrap_or_default();
        if let Some(position) = self
            .pending_self_writes
            .iter()
            .position(|written| written == query)
        {
            self.pending_self_writes.drain(..=position);
            return Navigation::SelfOriginated;
        }
        self.pending_self_writes.clear();
        Navigation::External(UrlState::from_url(url))
    }
}

/// In-process address bar with a back stack.
pub struct MemoryLocation {
    inner: Mutex<LocationHistory>,
}

struct LocationHistory {
    current: Url,
    previous: Vec<Url>,
    replacements: usize,
}

impl MemoryLocation {
    pub fn new(initial: Url) -> Self {
        Self {
            inner: Mutex::new(LocationHistory {
                current: initial,
                previous: Vec::new(),
                replacements: 0,
            }),
        }
    }

    /// Simulates the user navigating to `url` (typing it or following a link).
    pub fn push(&self, url: Url) {
        let mut inner = self.lock();
        let previous = std::mem::replace(&mut inner.current, url);
        inner.previous.push(previous);
    }

    /// Simulates the back button; returns the new current entry.
    pub fn back(&self) -> Option<Url> {
        let mut inner = self.lock();
        let previous = inner.previous.pop()?;
        inner.current = previous.clone();
        Some(previous)
    }

    pub fn history_len(&self) -> usize {
        self.lock().previous.len() + 1
    }

    pub fn replacements(&self) -> usize {
        self.lock().replacements
    }

    fn lock(&self) -> MutexGuard<'_, LocationHistory> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl LocationBar for MemoryLocation {
    fn current(&self) -> Url {
        self.lock().current.clone()
    }

    fn replace(&self, url: Url) {
        let mut inner = self.lock();
        inner.current = url;
        inner.replacements += 1;
    }
}
