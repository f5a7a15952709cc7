//! Nurse dashboard state: the patient creation form, per-patient instruction
//! drafts, the delete confirmation modal and the session roster.

pub mod delete;
pub mod form;
pub mod instruction;

pub use delete::{DeleteFlow, DeleteOutcome};
pub use form::{FormField, MedicationPart, MedicationRow, PatientForm, SubmitButton, SubmitOutcome};
pub use instruction::InstructionBoxes;

use crate::api::SystemStats;

/// Everything the nurse dashboard shows
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    pub form: PatientForm,
    pub instructions: InstructionBoxes,
    pub delete: DeleteFlow,
    pub stats: Option<SystemStats>,
    roster: Vec<String>,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Patients addressable this session, in the order they were added
    pub fn roster(&self) -> &[String] {
        &self.roster
    }

    pub fn add_patient(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.roster.iter().any(|p| p == name) {
            return false;
        }
        self.roster.push(name.to_string());
        true
    }

    pub fn remove_patient(&mut self, name: &str) {
        self.roster.retain(|p| p != name);
        self.instructions.forget(name);
    }

    pub fn apply_submit(&mut self, outcome: &SubmitOutcome) {
        if let Some(name) = &outcome.created {
            self.add_patient(name);
        }
    }

    pub fn apply_delete(&mut self, outcome: &DeleteOutcome) {
        if let Some(name) = &outcome.deleted {
            self.remove_patient(name);
        }
    }
}
