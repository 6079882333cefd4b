use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;
use tokio::sync::Notify;

use crate::applications::backend::{
    ApplicationsBackend, BackendError, BulkUpdateAck, ListQuery, ListResponse,
    StatusUpdateResponse,
};
use crate::applications::controller::{ApplicationListController, ListSettings};
use crate::applications::domain::{
    ApplicationId, ApplicationRecord, ApplicationStatus, JobId, ResumeRef,
};
use crate::applications::memory::InMemoryApplicationsBackend;
use crate::applications::url_sync::MemoryLocation;
use crate::applications::Url;

pub(super) const CONSOLE_URL: &str = "https://console.example.test/employer/applications";

pub(super) type TestController = ApplicationListController<ScriptedBackend, Arc<MemoryLocation>>;

pub(super) fn reference_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
        .single()
        .expect("valid reference time")
}

pub(super) fn app_id(n: usize) -> ApplicationId {
    ApplicationId(format!("app-{n:03}"))
}

/// Application `n`, applied `n` hours before the reference time.
pub(super) fn record(n: usize, status: ApplicationStatus) -> ApplicationRecord {
    let (job_id, job_title) = if n % 2 == 0 {
        ("job-backend", "Backend Engineer")
    } else {
        ("job-design", "Product Designer")
    };
    ApplicationRecord {
        id: app_id(n),
        applicant_name: format!("Candidate {n:03}"),
        applicant_email: format!("candidate{n:03}@example.test"),
        job_id: Some(JobId::new(job_id)),
        job_title: job_title.to_string(),
        status,
        applied_at: reference_time() - Duration::hours(n as i64),
        skills: if n % 3 == 0 {
            vec!["Rust".to_string(), "Postgres".to_string()]
        } else {
            vec!["Figma".to_string()]
        },
        resume_ref: Some(ResumeRef(format!("resumes/{n:03}.pdf"))),
    }
}

pub(super) fn records(
    range: std::ops::Range<usize>,
    status: ApplicationStatus,
) -> Vec<ApplicationRecord> {
    range.map(|n| record(n, status)).collect()
}

pub(super) fn console_url(query: &str) -> Url {
    let raw = if query.is_empty() {
        CONSOLE_URL.to_string()
    } else {
        format!("{CONSOLE_URL}?{}", query.trim_start_matches('?'))
    };
    Url::parse(&raw).expect("valid console url")
}

pub(super) fn memory_backend(records: Vec<ApplicationRecord>) -> InMemoryApplicationsBackend {
    InMemoryApplicationsBackend::new(records).with_reference_time(reference_time())
}

pub(super) fn mount(
    backend: Arc<ScriptedBackend>,
    query: &str,
    page_limit: u32,
) -> (TestController, Arc<MemoryLocation>) {
    let location = Arc::new(MemoryLocation::new(console_url(query)));
    let controller =
        ApplicationListController::mount(backend, location.clone(), ListSettings { page_limit });
    (controller, location)
}

pub(super) fn page_ids(controller: &TestController) -> Vec<ApplicationId> {
    controller
        .snapshot()
        .records
        .iter()
        .map(|record| record.id.clone())
        .collect()
}

/// Wraps the in-memory backend with call counters, failure switches, and an optional
/// gate that holds list requests open until released.
pub(super) struct ScriptedBackend {
    pub(super) inner: InMemoryApplicationsBackend,
    list_calls: AtomicUsize,
    mutation_calls: AtomicUsize,
    fail_list: AtomicBool,
    fail_mutations: AtomicBool,
    gate: Option<Arc<Notify>>,
    last_query: Mutex<Option<ListQuery>>,
}

impl ScriptedBackend {
    pub(super) fn new(inner: InMemoryApplicationsBackend) -> Self {
        Self {
            inner,
            list_calls: AtomicUsize::new(0),
            mutation_calls: AtomicUsize::new(0),
            fail_list: AtomicBool::new(false),
            fail_mutations: AtomicBool::new(false),
            gate: None,
            last_query: Mutex::new(None),
        }
    }

    pub(super) fn gated(inner: InMemoryApplicationsBackend, gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new(inner)
        }
    }

    pub(super) fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub(super) fn mutation_calls(&self) -> usize {
        self.mutation_calls.load(Ordering::SeqCst)
    }

    pub(super) fn fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    pub(super) fn fail_mutations(&self, fail: bool) {
        self.fail_mutations.store(fail, Ordering::SeqCst);
    }

    pub(super) fn last_query(&self) -> Option<ListQuery> {
        self.last_query.lock().expect("query mutex poisoned").clone()
    }
}

#[async_trait]
impl ApplicationsBackend for ScriptedBackend {
    async fn list(&self, query: &ListQuery) -> Result<ListResponse, BackendError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock().expect("query mutex poisoned") = Some(query.clone());
        match &self.gate {
            Some(gate) => gate.notified().await,
            None => tokio::task::yield_now().await,
        }
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(BackendError::Transport("connection reset".to_string()));
        }
        self.inner.list(query).await
    }

    async fn update_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<StatusUpdateResponse, BackendError> {
        self.mutation_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(BackendError::Status {
                status: 503,
                body: "maintenance".to_string(),
            });
        }
        self.inner.update_status(id, status).await
    }

    async fn bulk_update_status(
        &self,
        ids: &[ApplicationId],
        status: ApplicationStatus,
    ) -> Result<BulkUpdateAck, BackendError> {
        self.mutation_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(BackendError::Status {
                status: 503,
                body: "maintenance".to_string(),
            });
        }
        self.inner.bulk_update_status(ids, status).await
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("json body")
}
