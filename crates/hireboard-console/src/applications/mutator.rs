use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{info, warn};

use super::backend::{ApplicationsBackend, BackendError};
use super::domain::{ApplicationId, ApplicationRecord, ApplicationStatus};
use super::records::RecordSet;
use super::selection::SelectionSet;

/// A status change the backend refused or could not complete. Local state is untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MutationError {
    #[error("failed to move application {id} to {status}: {source}")]
    Single {
        id: ApplicationId,
        status: ApplicationStatus,
        #[source]
        source: BackendError,
    },
    #[error("failed to move {count} applications to {status}: {source}")]
    Bulk {
        count: usize,
        status: ApplicationStatus,
        #[source]
        source: BackendError,
    },
}

/// A confirmed status change, ready to be applied to the loaded page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusPatch {
    pub status: ApplicationStatus,
    /// Ids the server confirmed.
    pub applied: Vec<ApplicationId>,
    /// Ids the server reported as not updated.
    pub failed: Vec<ApplicationId>,
    /// Server copy of the record, when a single update echoes one.
    pub echoed: Option<ApplicationRecord>,
}

impl StatusPatch {
    /// Patches loaded records in place and returns how many changed.
    pub fn apply_to_records(&self, records: &mut RecordSet) -> usize {
        let mut patched = records.patch_status(&self.applied, self.status);
        if let Some(echoed) = &self.echoed {
            if records.upsert_loaded(echoed.clone()) && patched == 0 {
                patched = 1;
            }
        }
        patched
    }

    /// Drops confirmed ids from the selection; failed ids remain selected for a retry.
    pub fn release_selection(&self, selection: &mut SelectionSet) {
        selection.remove_all(&self.applied);
    }
}

/// Calls the mutation endpoints and turns confirmations into [`StatusPatch`]es. Nothing is
/// patched before the server confirms.
pub struct StatusMutator<B> {
    backend: Arc<B>,
}

impl<B> StatusMutator<B>
where
    B: ApplicationsBackend + 'static,
{
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    pub async fn change_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<StatusPatch, MutationError> {
        match self.backend.update_status(id, status).await {
            Ok(response) => {
                info!(application_id = %id, %status, "application status updated");
                let echoed = response.record.filter(|record| &record.id == id);
                Ok(StatusPatch {
                    status,
                    applied: vec![id.clone()],
                    failed: Vec::new(),
                    echoed,
                })
            }
            Err(source) => {
                warn!(application_id = %id, %status, error = %source, "status update failed");
                Err(MutationError::Single {
                    id: id.clone(),
                    status,
                    source,
                })
            }
        }
    }

    pub async fn bulk_change_status(
        &self,
        ids: &[ApplicationId],
        status: ApplicationStatus,
    ) -> Result<StatusPatch, MutationError> {
        let mut unique = BTreeSet::new();
        let ids: Vec<ApplicationId> = ids
            .iter()
            .filter(|id| unique.insert((*id).clone()))
            .cloned()
            .collect();

        if ids.is_empty() {
            return Ok(StatusPatch {
                status,
                applied: Vec::new(),
                failed: Vec::new(),
                echoed: None,
            });
        }

        match self.backend.bulk_update_status(&ids, status).await {
            Ok(ack) => {
                let failed: BTreeSet<&ApplicationId> = ack.failed.iter().collect();
                let applied: Vec<ApplicationId> = ids
                    .iter()
                    .filter(|id| !failed.contains(id))
                    .cloned()
                    .collect();
                info!(
                    requested = ids.len(),
                    updated = ack.updated,
                    failed = ack.failed.len(),
                    %status,
                    "bulk status update confirmed"
                );
                Ok(StatusPatch {
                    status,
                    applied,
                    failed: ack.failed,
                    echoed: None,
                })
            }
            Err(source) => {
                warn!(requested = ids.len(), %status, error = %source, "bulk status update failed");
                Err(MutationError::Bulk {
                    count: ids.len(),
                    status,
                    source,
                })
            }
        }
    }
}

/// Caller-side rule: moving applications to a destructive status in bulk needs an
/// explicit confirmation first; every other transition proceeds without a prompt.
pub fn requires_confirmation(status: ApplicationStatus) -> bool {
    status.is_destructive()
}

/// What the user is asked before a destructive bulk action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationRequest {
    pub status: ApplicationStatus,
    pub count: usize,
}

impl ConfirmationRequest {
    pub fn message(&self) -> String {
        format!(
            "Move {} selected application{} to {}?",
            self.count,
            if self.count == 1 { "" } else { "s" },
            self.status
        )
    }
}

/// Asks the user to confirm a destructive bulk action.
pub trait ConfirmPrompt {
    fn confirm(&self, request: &ConfirmationRequest) -> bool;
}

impl<F> ConfirmPrompt for F
where
    F: Fn(&ConfirmationRequest) -> bool,
{
    fn confirm(&self, request: &ConfirmationRequest) -> bool {
        self(request)
    }
}
