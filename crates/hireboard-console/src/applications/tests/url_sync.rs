use super::common::*;
use std::sync::Arc;

use crate::applications::domain::{
    ApplicationStatus, DateRange, JobId, SortDirection, SortKey, StatusFilter,
};
use crate::applications::pagination::SortSpec;
use crate::applications::url_sync::{
    LocationBar, MemoryLocation, Navigation, UrlState, UrlSynchronizer,
};

#[test]
fn decodes_every_recognized_key() {
    let state = UrlState::from_url(&console_url(
        "search=rust+dev&job_id=job-7&status=interview&date_range=30d&sort=job_title:asc&page=4",
    ));

    assert_eq!(state.filters.search_text, "rust dev");
    assert_eq!(state.filters.job_id, Some(JobId::new("job-7")));
    assert_eq!(
        state.filters.status,
        Some(StatusFilter::Known(ApplicationStatus::Interview))
    );
    assert_eq!(state.filters.date_range, Some(DateRange::Last30Days));
    assert_eq!(state.sort, SortSpec::new(SortKey::JobTitle, SortDirection::Asc));
    assert_eq!(state.page, 4);
}

#[test]
fn bad_values_fall_back_to_defaults() {
    let state = UrlState::from_url(&console_url(
        "sort=salary:sideways&page=0&utm_source=mail&search=%20%20",
    ));
    assert_eq!(state, UrlState::default());

    let state = UrlState::from_url(&console_url("page=two"));
    assert_eq!(state.page, 1);
}

#[test]
fn unrecognized_filters_are_kept_verbatim() {
    let state = UrlState::from_url(&console_url("status=archived&date_range=1y"));
    assert_eq!(
        state.filters.status,
        Some(StatusFilter::Unrecognized("archived".to_string()))
    );
    assert_eq!(
        state.filters.date_range,
        Some(DateRange::Unrecognized("1y".to_string()))
    );
}

#[test]
fn encoding_omits_defaults() {
    let mut url = console_url("");
    UrlState::default().apply_to_url(&mut url);
    assert_eq!(url.query(), None);

    let mut state = UrlState::default();
    state.filters.status = Some(ApplicationStatus::Offer.into());
    state.page = 3;
    state.apply_to_url(&mut url);
    assert_eq!(url.query(), Some("status=offer&page=3"));
    assert_eq!(url.path(), "/employer/applications");
}

#[test]
fn encoded_state_decodes_to_itself() {
    let mut state = UrlState::default();
    state.filters.search_text = "ana & co".to_string();
    state.filters.job_id = Some(JobId::new("job/42"));
    state.sort = SortSpec::new(SortKey::ApplicantName, SortDirection::Asc);
    state.page = 2;

    let mut url = console_url("");
    state.apply_to_url(&mut url);
    assert_eq!(UrlState::from_url(&url), state);
}

#[test]
fn unchanged_state_is_not_rewritten() {
    let location = Arc::new(MemoryLocation::new(console_url("status=hired")));
    let mut sync = UrlSynchronizer::new(location.clone());
    let hydrated = sync.hydrate();

    assert!(!sync.write(&hydrated));
    assert_eq!(location.replacements(), 0);

    let mut next = hydrated.clone();
    next.page = 2;
    assert!(sync.write(&next));
    assert_eq!(location.replacements(), 1);
    assert_eq!(location.history_len(), 1);
}

#[test]
fn observe_distinguishes_own_writes() {
    let location = Arc::new(MemoryLocation::new(console_url("")));
    let mut sync = UrlSynchronizer::new(location.clone());

    let mut state = UrlState::default();
    state.page = 5;
    sync.write(&state);
    assert_eq!(sync.observe(&location.current()), Navigation::SelfOriginated);

    // the same address reported again is no longer ours
    assert_eq!(
        sync.observe(&location.current()),
        Navigation::External(state)
    );
}

#[test]
fn queued_writes_are_acknowledged_in_order() {
    let location = Arc::new(MemoryLocation::new(console_url("")));
    let mut sync = UrlSynchronizer::new(location.clone());

    let mut first = UrlState::default();
    first.filters.status = Some(ApplicationStatus::Offer.into());
    sync.write(&first);
    let mut second = first.clone();
    second.page = 2;
    sync.write(&second);

    assert_eq!(
        sync.observe(&console_url("status=offer")),
        Navigation::SelfOriginated
    );
    assert_eq!(
        sync.observe(&console_url("status=offer&page=2")),
        Navigation::SelfOriginated
    );
    assert_eq!(
        sync.observe(&console_url("status=offer")),
        Navigation::External(first)
    );
}

#[test]
fn reporting_a_later_write_acknowledges_earlier_ones() {
    let location = Arc::new(MemoryLocation::new(console_url("")));
    let mut sync = UrlSynchronizer::new(location.clone());

    for page in 2..=4 {
        let state = UrlState {
            page,
            ..UrlState::default()
        };
        sync.write(&state);
    }

    assert_eq!(sync.observe(&location.current()), Navigation::SelfOriginated);
    assert!(matches!(
        sync.observe(&console_url("page=2")),
        Navigation::External(UrlState { page: 2, .. })
    ));
}
