use std::fmt;
use std::str::FromStr;

use super::domain::{SortDirection, SortKey, SortParseError};

pub const DEFAULT_PAGE_LIMIT: u32 = 20;

/// Ordering requested from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            key: SortKey::AppliedAt,
            direction: SortDirection::Desc,
        }
    }
}

impl SortSpec {
    pub const fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    /// Wire form `field:direction`.
    pub fn to_param(self) -> String {
        format!("{}:{}", self.key.field(), self.direction.as_str())
    }

    pub fn is_default(self) -> bool {
        self == SortSpec::default()
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.key.field(), self.direction.as_str())
    }
}

impl FromStr for SortSpec {
    type Err = SortParseError;

    /// Accepts `field:direction` or a bare `field`, which sorts descending.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (field, direction) = match value.split_once(':') {
            Some((field, direction)) => (field, direction.parse()?),
            None => (value, SortDirection::Desc),
        };
        Ok(SortSpec::new(field.parse()?, direction))
    }
}

/// Pagination window plus the server-reported total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    page: u32,
    limit: u32,
    total: u64,
}

impl PageState {
    pub fn new(limit: u32) -> Self {
        Self {
            page: 1,
            limit: limit.max(1),
            total: 0,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// `ceil(total / limit)`; zero when there are no matches.
    pub fn total_pages(&self) -> u32 {
        let pages = self.total.div_ceil(u64::from(self.limit));
        u32::try_from(pages).unwrap_or(u32::MAX)
    }
}

/// Result of reconciling the page against a new server total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageClamp {
    Unchanged,
    Clamped { from: u32, to: u32 },
}

#[derive(Debug, Clone)]
pub struct SortPageStore {
    sort: SortSpec,
    page: PageState,
}

impl SortPageStore {
    pub fn new(limit: u32) -> Self {
        Self {
            sort: SortSpec::default(),
            page: PageState::new(limit),
        }
    }

    pub fn sort(&self) -> SortSpec {
        self.sort
    }

    pub fn page_state(&self) -> PageState {
        self.page
    }

    /// Same key flips the direction; a different key starts descending. Either way the
    /// page goes back to 1.
    pub fn set_sort(&mut self, key: SortKey) {
        self.sort = if self.sort.key == key {
            SortSpec::new(key, self.sort.direction.flipped())
        } else {
            SortSpec::new(key, SortDirection::Desc)
        };
        self.page.page = 1;
    }

    pub fn set_page(&mut self, page: u32) {
        self.page.page = page.max(1);
    }

    pub fn apply_server_total(&mut self, total: u64) -> PageClamp {
        self.page.total = total;
        let last_page = self.page.total_pages().max(1);
        if self.page.page > last_page {
            let from = self.page.page;
            self.page.page = last_page;
            PageClamp::Clamped {
                from,
                to: last_page,
            }
        } else {
            PageClamp::Unchanged
        }
    }

    pub(crate) fn replace_sort(&mut self, sort: SortSpec) {
        self.sort = sort;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_sort_on_same_key_alternates_direction() {
        let mut store = SortPageStore::new(DEFAULT_PAGE_LIMIT);
        store.set_sort(SortKey::ApplicantName);

        let mut seen = vec![store.sort().direction];
        for _ in 0..4 {
            store.set_sort(SortKey::ApplicantName);
            seen.push(store.sort().direction);
        }

        assert_eq!(
            seen,
            vec![
                SortDirection::Desc,
                SortDirection::Asc,
                SortDirection::Desc,
                SortDirection::Asc,
                SortDirection::Desc,
            ]
        );
    }

    #[test]
    fn switching_key_defaults_to_descending() {
        let mut store = SortPageStore::new(DEFAULT_PAGE_LIMIT);
        store.set_sort(SortKey::AppliedAt);
        assert_eq!(store.sort().direction, SortDirection::Asc);

        store.set_sort(SortKey::Status);
        assert_eq!(store.sort(), SortSpec::new(SortKey::Status, SortDirection::Desc));
    }

    #[test]
    fn set_page_never_drops_below_one() {
        let mut store = SortPageStore::new(10);
        store.set_page(0);
        assert_eq!(store.page_state().page(), 1);
        store.set_page(4);
        assert_eq!(store.page_state().page(), 4);
    }

    #[test]
    fn shrinking_total_clamps_page() {
        let mut store = SortPageStore::new(20);
        store.apply_server_total(100);
        store.set_page(5);

        assert_eq!(
            store.apply_server_total(41),
            PageClamp::Clamped { from: 5, to: 3 }
        );
        assert_eq!(store.page_state().page(), 3);
        assert_eq!(store.page_state().total_pages(), 3);
        assert_eq!(store.apply_server_total(41), PageClamp::Unchanged);
    }

    #[test]
    fn empty_total_keeps_first_page() {
        let mut store = SortPageStore::new(20);
        store.set_page(2);
        assert_eq!(
            store.apply_server_total(0),
            PageClamp::Clamped { from: 2, to: 1 }
        );
        assert_eq!(store.page_state().total_pages(), 0);
        assert_eq!(store.apply_server_total(0), PageClamp::Unchanged);
    }

    #[test]
    fn sort_param_round_trips_and_rejects_unknown_fields() {
        let spec: SortSpec = "applied_at:asc".parse().expect("valid sort");
        assert_eq!(spec, SortSpec::new(SortKey::AppliedAt, SortDirection::Asc));
        assert_eq!(spec.to_param(), "applied_at:asc");

        let bare: SortSpec = "job_title".parse().expect("bare field");
        assert_eq!(bare.direction, SortDirection::Desc);

        assert!(matches!(
            "salary:asc".parse::<SortSpec>(),
            Err(SortParseError::UnknownField(_))
        ));
        assert!(matches!(
            "status:sideways".parse::<SortSpec>(),
            Err(SortParseError::UnknownDirection(_))
        ));
    }
}
