use tracing::{info, warn};

use crate::api::{AckReply, CareApi, Envelope};
use crate::error::ApiError;
use crate::notice::Notice;

/// Confirmation modal for deleting a patient.
///
/// `Idle -> Confirming -> Idle` on cancel or a click outside the modal,
/// `Confirming -> Deleting -> Idle` once confirmed. At most one target is
/// held at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DeleteFlow {
    #[default]
    Idle,
    Confirming { target: String },
    Deleting { target: String },
}

/// Result of a settled delete request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub notice: Notice,
    /// Set when the backend removed the patient
    pub deleted: Option<String>,
}

impl DeleteFlow {
    pub fn is_modal_visible(&self) -> bool {
        !matches!(self, DeleteFlow::Idle)
    }

    pub fn target(&self) -> Option<&str> {
        match self {
            DeleteFlow::Idle => None,
            DeleteFlow::Confirming { target } | DeleteFlow::Deleting { target } => Some(target),
        }
    }

    /// Show the modal for `patient`, replacing any earlier selection
    pub fn open(&mut self, patient: &str) {
        if matches!(self, DeleteFlow::Deleting { .. }) {
            return;
        }
        *self = DeleteFlow::Confirming {
            target: patient.to_string(),
        };
    }

    pub fn cancel(&mut self) {
        if matches!(self, DeleteFlow::Confirming { .. }) {
            *self = DeleteFlow::Idle;
        }
    }

    /// A click that landed outside the modal dismisses it
    pub fn click_outside(&mut self) {
        self.cancel();
    }

    /// Move to `Deleting` and hand back the patient to delete
    pub fn confirm(&mut self) -> Option<String> {
        match std::mem::take(self) {
            DeleteFlow::Confirming { target } => {
                *self = DeleteFlow::Deleting {
                    target: target.clone(),
                };
                Some(target)
            }
            other => {
                *self = other;
                None
            }
        }
    }

    /// Settle the request started by `confirm` and return to `Idle`,
    /// whatever the request produced. `None` when no delete was running.
    pub fn finish(&mut self, result: Result<AckReply, ApiError>) -> Option<DeleteOutcome> {
        let target = match std::mem::take(self) {
            DeleteFlow::Deleting { target } => target,
            other => {
                warn!("Delete reply arrived with no delete running");
                *self = other;
                return None;
            }
        };

        let outcome = match result.and_then(Envelope::into_result) {
            Ok(_) => {
                info!(patient = %target, "Patient deleted");
                DeleteOutcome {
                    notice: Notice::success(format!("Patient {} deleted successfully!", target)),
                    deleted: Some(target),
                }
            }
            Err(ApiError::Rejected(reason)) => {
                warn!(patient = %target, %reason, "Delete rejected");
                DeleteOutcome {
                    notice: Notice::error(format!("Error: {}", reason)),
                    deleted: None,
                }
            }
            Err(e) => {
                warn!(patient = %target, error = %e, "Delete failed");
                DeleteOutcome {
                    notice: Notice::error(format!("Error deleting patient: {}", e)),
                    deleted: None,
                }
            }
        };
        Some(outcome)
    }

    /// Confirm and run the request. `None` when nothing was awaiting
    /// confirmation.
    pub async fn confirm_and_delete<A: CareApi + ?Sized>(&mut self, api: &A) -> Option<DeleteOutcome> {
        let target = self.confirm()?;
        let result = api.delete_patient(&target).await;
        self.finish(result)
    }
}
