use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{ApplicationId, ApplicationRecord, ApplicationStatus};

/// Aggregate counts as reported by the backend. Keys are raw status labels so a
/// malformed payload can be detected instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerStats {
    pub total: u64,
    #[serde(default)]
    pub by_status: BTreeMap<String, u64>,
}

/// Whether a summary describes the whole result set or only the loaded page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatsScope {
    Global,
    /// Per-status counts only cover the current page. `total` is still the
    /// server-reported figure once the fetch coordinator has applied it.
    PageLocal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsSummary {
    pub total: u64,
    pub by_status: BTreeMap<ApplicationStatus, u64>,
    pub scope: StatsScope,
}

impl Default for StatsSummary {
    fn default() -> Self {
        Self {
            total: 0,
            by_status: zeroed_counts(),
            scope: StatsScope::Global,
        }
    }
}

impl StatsSummary {
    pub fn count(&self, status: ApplicationStatus) -> u64 {
        self.by_status.get(&status).copied().unwrap_or(0)
    }
}

fn zeroed_counts() -> BTreeMap<ApplicationStatus, u64> {
    ApplicationStatus::ALL
        .into_iter()
        .map(|status| (status, 0))
        .collect()
}

/// Returns the server summary when it is well-formed, otherwise tallies `records`.
///
/// A server summary is well-formed when every key is a known status and no count
/// exceeds the reported total. The fallback is page-local: it counts only the
/// records passed in and reports `records.len()` as its total.
pub fn derive_stats(records: &[ApplicationRecord], server: Option<&ServerStats>) -> StatsSummary {
    if let Some(summary) = server.and_then(well_formed) {
        return summary;
    }

    let mut by_status = zeroed_counts();
    for record in records {
        *by_status.entry(record.status).or_insert(0) += 1;
    }

    StatsSummary {
        total: records.len() as u64,
        by_status,
        scope: StatsScope::PageLocal,
    }
}

fn well_formed(stats: &ServerStats) -> Option<StatsSummary> {
    let mut by_status = zeroed_counts();
    for (label, count) in &stats.by_status {
        let status = label.parse::<ApplicationStatus>().ok()?;
        if *count > stats.total {
            return None;
        }
        by_status.insert(status, *count);
    }

    Some(StatsSummary {
        total: stats.total,
        by_status,
        scope: StatsScope::Global,
    })
}

/// The currently loaded page of applications.
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    records: Vec<ApplicationRecord>,
}

impl RecordSet {
    pub fn records(&self) -> &[ApplicationRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn page_ids(&self) -> Vec<ApplicationId> {
        self.records.iter().map(|record| record.id.clone()).collect()
    }

    pub fn get(&self, id: &ApplicationId) -> Option<&ApplicationRecord> {
        self.records.iter().find(|record| &record.id == id)
    }

    /// Evicts the previous page.
    pub fn replace(&mut self, records: Vec<ApplicationRecord>) {
        self.records = records;
    }

    /// Sets `status` on every loaded record whose id is in `ids`, returning how many
    /// records changed. Ids not on this page are ignored.
    pub fn patch_status<'a>(
        &mut self,
        ids: impl IntoIterator<Item = &'a ApplicationId>,
        status: ApplicationStatus,
    ) -> usize {
        let mut patched = 0;
        for id in ids {
            if let Some(record) = self.records.iter_mut().find(|record| &record.id == id) {
                record.status = status;
                patched += 1;
            }
        }
        patched
    }

    /// Replaces a loaded record with the server's copy; returns false when the record
    /// is not on this page.
    pub fn upsert_loaded(&mut self, updated: ApplicationRecord) -> bool {
        match self
            .records
            .iter_mut()
            .find(|record| record.id == updated.id)
        {
            Some(slot) => {
                *slot = updated;
                true
            }
            None => false,
        }
    }
}
