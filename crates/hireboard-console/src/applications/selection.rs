use std::collections::BTreeSet;

use super::domain::ApplicationId;

/// Ids the user has marked for a bulk action. The set is global across pages: ids stay
/// selected when the user navigates away from the page they were picked on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    selected: BTreeSet<ApplicationId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn contains(&self, id: &ApplicationId) -> bool {
        self.selected.contains(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ApplicationId> {
        self.selected.iter()
    }

    pub fn ids(&self) -> Vec<ApplicationId> {
        self.selected.iter().cloned().collect()
    }

    pub fn toggle(&mut self, id: &ApplicationId) {
        if !self.selected.remove(id) {
            self.selected.insert(id.clone());
        }
    }

    pub fn select_all_on_page(&mut self, page_ids: &[ApplicationId]) {
        self.selected.extend(page_ids.iter().cloned());
    }

    /// Removes exactly `page_ids`; selections made on other pages are kept.
    pub fn deselect_all_on_page(&mut self, page_ids: &[ApplicationId]) {
        for id in page_ids {
            self.selected.remove(id);
        }
    }

    /// An empty page is never "all selected".
    pub fn is_all_on_page_selected(&self, page_ids: &[ApplicationId]) -> bool {
        !page_ids.is_empty() && page_ids.iter().all(|id| self.selected.contains(id))
    }

    /// At least one but not every id on the page is selected (indeterminate checkbox).
    pub fn is_some_on_page_selected(&self, page_ids: &[ApplicationId]) -> bool {
        let hits = page_ids
            .iter()
            .filter(|id| self.selected.contains(*id))
            .count();
        hits > 0 && hits < page_ids.len()
    }

    pub fn remove_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a ApplicationId>) {
        for id in ids {
            self.selected.remove(id);
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }
}
