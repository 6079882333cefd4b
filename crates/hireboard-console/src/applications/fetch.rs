use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::backend::{ApplicationsBackend, BackendError, ListQuery, ListResponse};

/// The list request failed; the previously loaded page stays in place.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to load applications: {source}")]
pub struct LoadError {
    #[from]
    pub source: BackendError,
}

/// Clears the in-flight flag when dropped, which covers success, failure, and a caller
/// dropping the pending future.
struct InFlight<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Issues list requests with at most one outstanding at a time. Calls made while a
/// request is pending are dropped, not queued.
pub struct FetchCoordinator<B> {
    backend: Arc<B>,
    in_flight: AtomicBool,
    requests_issued: AtomicU64,
}

impl<B> FetchCoordinator<B>
where
    B: ApplicationsBackend + 'static,
{
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            in_flight: AtomicBool::new(false),
            requests_issued: AtomicU64::new(0),
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn requests_issued(&self) -> u64 {
        self.requests_issued.load(Ordering::Relaxed)
    }

    /// Returns `Ok(None)` when another request is already pending.
    pub async fn fetch(&self, query: &ListQuery) -> Result<Option<ListResponse>, LoadError> {
        let Some(_guard) = InFlight::acquire(&self.in_flight) else {
            debug!(page = query.page, "list request already in flight; skipping load");
            return Ok(None);
        };

        self.requests_issued.fetch_add(1, Ordering::Relaxed);
        match self.backend.list(query).await {
            Ok(response) => {
                info!(
                    page = query.page,
                    records = response.records.len(),
                    total = response.total,
                    "loaded applications page"
                );
                Ok(Some(response))
            }
            Err(error) => {
                warn!(page = query.page, %error, "failed to load applications page");
                Err(LoadError::from(error))
            }
        }
    }
}
