use std::sync::{Arc, Mutex, MutexGuard};

use reqwest::Url;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info};

use super::backend::{ApplicationsBackend, ListQuery, ListResponse};
use super::domain::{ApplicationId, ApplicationRecord, ApplicationStatus, SortKey};
use super::fetch::{FetchCoordinator, LoadError};
use super::filters::{FilterCriteria, FilterPatch, FilterStore};
use super::mutator::{
    requires_confirmation, ConfirmPrompt, ConfirmationRequest, MutationError, StatusMutator,
    StatusPatch,
};
use super::pagination::{PageClamp, SortPageStore, SortSpec, DEFAULT_PAGE_LIMIT};
use super::records::{derive_stats, RecordSet, StatsScope, StatsSummary};
use super::selection::SelectionSet;
use super::url_sync::{LocationBar, Navigation, UrlState, UrlSynchronizer};

/// Upper bound on follow-up fetches after the page is clamped within one `load()`.
const MAX_CLAMP_REFETCHES: usize = 2;

/// Per-session list settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListSettings {
    pub page_limit: u32,
}

impl Default for ListSettings {
    fn default() -> Self {
        Self {
            page_limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded {
        page: u32,
        records: usize,
        total: u64,
        clamped: bool,
    },
    /// Another load was pending; nothing was requested.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkSummary {
    pub status: ApplicationStatus,
    pub confirmed: usize,
    pub failed: Vec<ApplicationId>,
    pub patched_on_page: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkOutcome {
    Applied(BulkSummary),
    /// The user declined the confirmation prompt.
    Declined,
    NothingSelected,
}

/// Coarse rendering state of the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum ViewState {
    Loading,
    /// Only shown when no load has ever succeeded.
    Error(String),
    Empty,
    Ready,
}

/// Everything a list view renders, captured at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListView {
    pub state: ViewState,
    pub records: Vec<ApplicationRecord>,
    pub stats: StatsSummary,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
    pub sort: String,
    pub selected_count: usize,
    pub all_on_page_selected: bool,
    pub some_on_page_selected: bool,
    /// Most recent load failure, for a non-blocking notification.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

struct ListState {
    filters: FilterStore,
    paging: SortPageStore,
    records: RecordSet,
    stats: StatsSummary,
    selection: SelectionSet,
    loaded_once: bool,
    last_error: Option<LoadError>,
}

impl ListState {
    fn new(settings: ListSettings, hydrated: UrlState) -> Self {
        let mut paging = SortPageStore::new(settings.page_limit);
        paging.replace_sort(hydrated.sort);
        paging.set_page(hydrated.page);
        Self {
            filters: FilterStore::new(hydrated.filters),
            paging,
            records: RecordSet::default(),
            stats: StatsSummary::default(),
            selection: SelectionSet::new(),
            loaded_once: false,
            last_error: None,
        }
    }

    fn url_state(&self) -> UrlState {
        UrlState {
            filters: self.filters.criteria().clone(),
            sort: self.paging.sort(),
            page: self.paging.page_state().page(),
        }
    }

    fn query(&self) -> ListQuery {
        ListQuery::from_state(
            self.filters.criteria(),
            self.paging.sort(),
            self.paging.page_state(),
        )
    }

    fn apply_response(&mut self, response: ListResponse) -> PageClamp {
        let mut stats = derive_stats(&response.records, response.stats.as_ref());
        if stats.scope == StatsScope::PageLocal {
            stats.total = response.total;
        }
        self.records.replace(response.records);
        self.stats = stats;
        self.loaded_once = true;
        self.last_error = None;
        self.paging.apply_server_total(response.total)
    }

    /// Applies a confirmed status change to the loaded page. Page-local stats are
    /// re-tallied; a server summary is left as reported.
    fn patch_records(&mut self, patch: &StatusPatch) -> usize {
        let patched = patch.apply_to_records(&mut self.records);
        if patched > 0 && self.stats.scope == StatsScope::PageLocal {
            let mut stats = derive_stats(self.records.records(), None);
            stats.total = self.paging.page_state().total();
            self.stats = stats;
        }
        patched
    }

    fn view(&self) -> ListView {
        let page_ids = self.records.page_ids();
        let page = self.paging.page_state();
        let state = match (&self.last_error, self.loaded_once) {
            (_, true) if self.records.is_empty() => ViewState::Empty,
            (_, true) => ViewState::Ready,
            (Some(error), false) => ViewState::Error(error.to_string()),
            (None, false) => ViewState::Loading,
        };

        ListView {
            state,
            records: self.records.records().to_vec(),
            stats: self.stats.clone(),
            page: page.page(),
            limit: page.limit(),
            total: page.total(),
            total_pages: page.total_pages(),
            sort: self.paging.sort().to_param(),
            selected_count: self.selection.len(),
            all_on_page_selected: self.selection.is_all_on_page_selected(&page_ids),
            some_on_page_selected: self.selection.is_some_on_page_selected(&page_ids),
            notice: self.last_error.as_ref().map(ToString::to_string),
        }
    }
}

/// Coordinates filter, sort, pagination, selection, and status mutations for the
/// employer application list.
///
/// Store mutations are synchronous. `load`, `change_status`, and the bulk operations are
/// the only methods that await the backend; no lock is held across those awaits.
pub struct ApplicationListController<B, L> {
    state: Mutex<ListState>,
    url: Mutex<UrlSynchronizer<L>>,
    fetcher: FetchCoordinator<B>,
    mutator: StatusMutator<B>,
    changes: watch::Sender<ListQuery>,
}

impl<B, L> ApplicationListController<B, L>
where
    B: ApplicationsBackend + 'static,
    L: LocationBar,
{
    /// Hydrates state from the current address before anything is fetched.
    pub fn mount(backend: Arc<B>, location: L, settings: ListSettings) -> Self {
        let mut url = UrlSynchronizer::new(location);
        let hydrated = url.hydrate();
        let state = ListState::new(settings, hydrated);
        url.write(&state.url_state());

        let (changes, _) = watch::channel(state.query());
        Self {
            state: Mutex::new(state),
            url: Mutex::new(url),
            fetcher: FetchCoordinator::new(backend.clone()),
            mutator: StatusMutator::new(backend),
            changes,
        }
    }

    /// Receives the combined list query after every filter, sort, or page change.
    pub fn subscribe(&self) -> watch::Receiver<ListQuery> {
        self.changes.subscribe()
    }

    pub fn query(&self) -> ListQuery {
        self.lock_state().query()
    }

    pub fn filters(&self) -> FilterCriteria {
        self.lock_state().filters.criteria().clone()
    }

    pub fn sort(&self) -> SortSpec {
        self.lock_state().paging.sort()
    }

    pub fn current_url(&self) -> Url {
        self.lock_url().location().current()
    }

    pub fn fetcher(&self) -> &FetchCoordinator<B> {
        &self.fetcher
    }

    pub fn snapshot(&self) -> ListView {
        self.lock_state().view()
    }

    pub fn set_filter(&self, patch: FilterPatch) {
        self.commit(|state| {
            state.filters.set_filter(patch);
            state.paging.set_page(1);
            state.selection.clear();
        });
    }

    pub fn reset_filters(&self) {
        self.commit(|state| {
            state.filters.reset();
            state.paging.set_page(1);
            state.selection.clear();
        });
    }

    pub fn set_sort(&self, key: SortKey) {
        self.commit(|state| state.paging.set_sort(key));
    }

    pub fn set_page(&self, page: u32) {
        self.commit(|state| state.paging.set_page(page));
    }

    pub fn toggle_selection(&self, id: &ApplicationId) {
        self.lock_state().selection.toggle(id);
    }

    pub fn select_all_on_page(&self) {
        let mut state = self.lock_state();
        let page_ids = state.records.page_ids();
        state.selection.select_all_on_page(&page_ids);
    }

    pub fn deselect_all_on_page(&self) {
        let mut state = self.lock_state();
        let page_ids = state.records.page_ids();
        state.selection.deselect_all_on_page(&page_ids);
    }

    pub fn clear_selection(&self) {
        self.lock_state().selection.clear();
    }

    pub fn selection(&self) -> SelectionSet {
        self.lock_state().selection.clone()
    }

    /// Handles a location change reported by the host. Returns `true` when the list state
    /// changed and a `load()` is due.
    pub fn handle_navigation(&self, url: &Url) -> bool {
        let incoming = match self.lock_url().observe(url) {
            Navigation::SelfOriginated => return false,
            Navigation::External(incoming) => incoming,
        };

        let changed = {
            let mut state = self.lock_state();
            let current = state.url_state();
            if current == incoming {
                false
            } else {
                if current.filters != incoming.filters {
                    state.filters.replace(incoming.filters);
                    state.selection.clear();
                }
                state.paging.replace_sort(incoming.sort);
                state.paging.set_page(incoming.page);
                true
            }
        };

        if changed {
            debug!(url = %url, "external navigation changed list state");
            self.publish();
        }
        changed
    }

    /// Fetches the page described by the current state. A call made while another load is
    /// pending returns [`LoadOutcome::Skipped`] without issuing a request.
    pub async fn load(&self) -> Result<LoadOutcome, LoadError> {
        let mut refetches = 0;
        loop {
            let query = self.query();
            let response = match self.fetcher.fetch(&query).await {
                Ok(Some(response)) => response,
                Ok(None) => return Ok(LoadOutcome::Skipped),
                Err(error) => {
                    self.lock_state().last_error = Some(error.clone());
                    return Err(error);
                }
            };

            let records = response.records.len();
            let total = response.total;
            let clamp = self.lock_state().apply_response(response);

            if let PageClamp::Clamped { from, to } = clamp {
                info!(from, to, total, "page clamped after total shrank");
                self.sync_url();
                self.publish();
                if refetches < MAX_CLAMP_REFETCHES {
                    refetches += 1;
                    continue;
                }
            }

            return Ok(LoadOutcome::Loaded {
                page: query.page,
                records,
                total,
                clamped: refetches > 0,
            });
        }
    }

    /// Updates one application; the loaded record changes only after the server confirms.
    pub async fn change_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<(), MutationError> {
        let patch = self.mutator.change_status(id, status).await?;
        self.lock_state().patch_records(&patch);
        Ok(())
    }

    /// Updates `ids` in one request. On success the confirmed ids are patched on the
    /// loaded page and removed from the selection; on failure nothing changes.
    pub async fn bulk_change_status(
        &self,
        ids: &[ApplicationId],
        status: ApplicationStatus,
    ) -> Result<BulkOutcome, MutationError> {
        if ids.is_empty() {
            return Ok(BulkOutcome::NothingSelected);
        }

        let patch = self.mutator.bulk_change_status(ids, status).await?;
        let mut state = self.lock_state();
        let patched_on_page = state.patch_records(&patch);
        patch.release_selection(&mut state.selection);

        Ok(BulkOutcome::Applied(BulkSummary {
            status,
            confirmed: patch.applied.len(),
            failed: patch.failed,
            patched_on_page,
        }))
    }

    /// Applies `status` to every selected id, across pages. Destructive transitions ask
    /// `prompt` first; other transitions never prompt.
    pub async fn bulk_change_selected<P>(
        &self,
        status: ApplicationStatus,
        prompt: &P,
    ) -> Result<BulkOutcome, MutationError>
    where
        P: ConfirmPrompt + ?Sized,
    {
        let ids = self.lock_state().selection.ids();
        if ids.is_empty() {
            return Ok(BulkOutcome::NothingSelected);
        }

        if requires_confirmation(status) {
            let request = ConfirmationRequest {
                status,
                count: ids.len(),
            };
            if !prompt.confirm(&request) {
                debug!(%status, count = ids.len(), "bulk action declined");
                return Ok(BulkOutcome::Declined);
            }
        }

        self.bulk_change_status(&ids, status).await
    }

    fn commit<F>(&self, apply: F)
    where
        F: FnOnce(&mut ListState),
    {
        {
            let mut state = self.lock_state();
            apply(&mut state);
        }
        self.sync_url();
        self.publish();
    }

    fn sync_url(&self) {
        let url_state = self.lock_state().url_state();
        self.lock_url().write(&url_state);
    }

    fn publish(&self) {
        let query = self.query();
        self.changes.send_replace(query);
    }

    fn lock_state(&self) -> MutexGuard<'_, ListState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_url(&self) -> MutexGuard<'_, UrlSynchronizer<L>> {
        self.url
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
