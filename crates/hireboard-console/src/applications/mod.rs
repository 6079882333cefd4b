//! Employer application list: filter, sort, and page state mirrored into the URL, a
//! guarded list fetch, a cross-page selection, and status mutations that patch the
//! loaded page after the backend confirms them.

pub mod backend;
pub mod controller;
pub mod domain;
pub mod fetch;
pub mod filters;
pub mod http;
pub mod memory;
pub mod mutator;
pub mod pagination;
pub mod records;
pub mod router;
pub mod selection;
pub mod url_sync;

#[cfg(test)]
mod tests;

pub use backend::{
    ApplicationsBackend, BackendError, BulkStatusRequest, BulkUpdateAck, ListQuery, ListResponse,
    StatusUpdateRequest, StatusUpdateResponse,
};
pub use controller::{
    ApplicationListController, BulkOutcome, BulkSummary, ListSettings, ListView, LoadOutcome,
    ViewState,
};
pub use domain::{
    ApplicationId, ApplicationRecord, ApplicationStatus, DateRange, JobId, ResumeRef,
    SortDirection, SortKey, StatusFilter,
};
pub use fetch::{FetchCoordinator, LoadError};
pub use filters::{FilterCriteria, FilterPatch, FilterStore};
pub use http::HttpApplicationsBackend;
pub use memory::InMemoryApplicationsBackend;
pub use mutator::{
    requires_confirmation, ConfirmPrompt, ConfirmationRequest, MutationError, StatusMutator,
    StatusPatch,
};
pub use pagination::{PageClamp, PageState, SortPageStore, SortSpec, DEFAULT_PAGE_LIMIT};
pub use records::{derive_stats, RecordSet, ServerStats, StatsScope, StatsSummary};
pub use router::application_router;
pub use selection::SelectionSet;
pub use reqwest::Url;
pub use url_sync::{LocationBar, MemoryLocation, Navigation, UrlState, UrlSynchronizer};
