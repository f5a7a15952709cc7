use tracing::{info, warn};

use crate::api::{CareApi, CreatePatientReply, Envelope, Medication, PatientDraft};
use crate::error::{ApiError, ValidationError};
use crate::notice::Notice;
use crate::validation::{check_email, check_patient_id, is_valid_email, split_tags, FieldCheck};

pub const SUBMIT_LABEL: &str = "Create Patient";
pub const SUBMIT_BUSY_LABEL: &str = "Creating patient and sending email...";

/// One editable medication line. Only complete rows make it into a draft.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MedicationRow {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
}

impl MedicationRow {
    pub fn to_medication(&self) -> Option<Medication> {
        if self.name.is_empty() || self.dosage.is_empty() || self.frequency.is_empty() {
            return None;
        }
        Some(Medication {
            name: self.name.clone(),
            dosage: self.dosage.clone(),
            frequency: self.frequency.clone(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MedicationPart {
    Name,
    Dosage,
    Frequency,
}

/// Addressable inputs of the patient form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Email,
    PatientId,
    Conditions,
    Allergies,
    DischargePlan,
    Medication { row: usize, part: MedicationPart },
}

/// The submit control; its label and enabled flag are the only UI state that
/// lives across the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitButton {
    pub label: &'static str,
    pub enabled: bool,
}

impl Default for SubmitButton {
    fn default() -> Self {
        Self {
            label: SUBMIT_LABEL,
            enabled: true,
        }
    }
}

/// What the dashboard should do once a creation request settles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub notice: Notice,
    /// Name of the patient the backend created, if any
    pub created: Option<String>,
}

/// Patient creation form of the nurse dashboard
#[derive(Debug, Clone)]
pub struct PatientForm {
    pub name: String,
    pub email: String,
    pub patient_id: String,
    pub conditions: String,
    pub allergies: String,
    pub discharge_plan: String,
    pub medications: Vec<MedicationRow>,
    pub email_check: FieldCheck,
    pub patient_id_check: FieldCheck,
    button: SubmitButton,
}

impl Default for PatientForm {
    fn default() -> Self {
        Self::new()
    }
}

impl PatientForm {
    pub fn new() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            patient_id: String::new(),
            conditions: String::new(),
            allergies: String::new(),
            discharge_plan: String::new(),
            medications: vec![MedicationRow::default()],
            email_check: FieldCheck::Clean,
            patient_id_check: FieldCheck::Clean,
            button: SubmitButton::default(),
        }
    }

    pub fn button(&self) -> SubmitButton {
        self.button
    }

    pub fn is_submitting(&self) -> bool {
        !self.button.enabled
    }

    /// Append an empty medication row. There is no upper bound.
    pub fn add_medication(&mut self) {
        self.medications.push(MedicationRow::default());
    }

    pub fn remove_medication(&mut self, row: usize) -> bool {
        if row < self.medications.len() {
            self.medications.remove(row);
            true
        } else {
            false
        }
    }

    pub fn field(&self, field: FormField) -> Option<&str> {
        let value = match field {
            FormField::Name => &self.name,
            FormField::Email => &self.email,
            FormField::PatientId => &self.patient_id,
            FormField::Conditions => &self.conditions,
            FormField::Allergies => &self.allergies,
            FormField::DischargePlan => &self.discharge_plan,
            FormField::Medication { row, part } => {
                let med = self.medications.get(row)?;
                match part {
                    MedicationPart::Name => &med.name,
                    MedicationPart::Dosage => &med.dosage,
                    MedicationPart::Frequency => &med.frequency,
                }
            }
        };
        Some(value.as_str())
    }

    fn field_mut(&mut self, field: FormField) -> Option<&mut String> {
        let value = match field {
            FormField::Name => &mut self.name,
            FormField::Email => &mut self.email,
            FormField::PatientId => &mut self.patient_id,
            FormField::Conditions => &mut self.conditions,
            FormField::Allergies => &mut self.allergies,
            FormField::DischargePlan => &mut self.discharge_plan,
            FormField::Medication { row, part } => {
                let med = self.medications.get_mut(row)?;
                match part {
                    MedicationPart::Name => &mut med.name,
                    MedicationPart::Dosage => &mut med.dosage,
                    MedicationPart::Frequency => &mut med.frequency,
                }
            }
        };
        Some(value)
    }

    /// Apply an edit to one input, then re-run that input's cosmetic check.
    /// The check never rejects the edit.
    pub fn edit(&mut self, field: FormField, apply: impl FnOnce(&mut String)) {
        let Some(value) = self.field_mut(field) else {
            return;
        };
        apply(value);

        match field {
            FormField::Email => self.email_check = check_email(&self.email),
            FormField::PatientId => self.patient_id_check = check_patient_id(&self.patient_id),
            _ => {}
        }
    }

    /// Gather the current inputs into a draft, enforcing the required fields
    /// and the email shape.
    pub fn build_draft(&self) -> Result<PatientDraft, ValidationError> {
        let draft = PatientDraft {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            patient_id: self.patient_id.trim().to_string(),
            conditions: split_tags(&self.conditions),
            medications: self
                .medications
                .iter()
                .filter_map(MedicationRow::to_medication)
                .collect(),
            allergies: split_tags(&self.allergies),
            discharge_plan: self.discharge_plan.clone(),
        };

        if draft.name.is_empty() || draft.email.is_empty() || draft.patient_id.is_empty() {
            return Err(ValidationError::MissingRequired);
        }
        if !is_valid_email(&draft.email) {
            return Err(ValidationError::InvalidEmail);
        }

        Ok(draft)
    }

    /// Validate and switch the button to its busy state. The returned draft
    /// is what should be sent.
    pub fn begin_submit(&mut self) -> Result<PatientDraft, ValidationError> {
        if self.is_submitting() {
            return Err(ValidationError::Busy);
        }

        let draft = self.build_draft()?;
        self.button = SubmitButton {
            label: SUBMIT_BUSY_LABEL,
            enabled: false,
        };
        Ok(draft)
    }

    /// Settle a creation request: restore the button and, on success, start
    /// over with a blank form.
    pub fn finish_submit(
        &mut self,
        draft: &PatientDraft,
        result: Result<CreatePatientReply, ApiError>,
    ) -> SubmitOutcome {
        self.button = SubmitButton::default();

        match result.and_then(Envelope::into_result) {
            Ok(reply) => {
                info!(
                    patient_id = %draft.patient_id,
                    agent = reply.agent_id.is_some(),
                    "Patient created"
                );
                *self = Self::new();
                SubmitOutcome {
                    notice: creation_notice(draft, &reply),
                    created: Some(draft.name.clone()),
                }
            }
            Err(ApiError::Rejected(reason)) => {
                warn!(patient_id = %draft.patient_id, %reason, "Patient creation rejected");
                SubmitOutcome {
                    notice: Notice::error(format!("Error: {}", reason)),
                    created: None,
                }
            }
            Err(e) => {
                warn!(patient_id = %draft.patient_id, error = %e, "Patient creation failed");
                SubmitOutcome {
                    notice: Notice::error(format!("Error creating patient: {}", e)),
                    created: None,
                }
            }
        }
    }

    /// Validate, send, and settle in one go
    pub async fn submit<A: CareApi + ?Sized>(&mut self, api: &A) -> Result<SubmitOutcome, ValidationError> {
        let draft = self.begin_submit()?;
        let result = api.create_patient(&draft).await;
        Ok(self.finish_submit(&draft, result))
    }
}

/// Summary shown after a successful creation, with a line per service that
/// failed on the backend.
pub fn creation_message(draft: &PatientDraft, reply: &CreatePatientReply) -> String {
    let mut message = format!("Patient agent created successfully for {}!", draft.name);

    match reply.warnings.as_ref().filter(|w| w.any()) {
        Some(warnings) => {
            if warnings.letta_agent {
                message.push_str(
                    "\n\nWarning: AI agent creation failed - patient can still login but chat may not work.",
                );
            }
            if warnings.email_delivery {
                message.push_str("\n\nWarning: Email delivery failed - please share credentials manually:");
                message.push_str(&format!("\nEmail: {}", draft.email));
                message.push_str(&format!(
                    "\nPassword: {}",
                    reply.password.as_deref().unwrap_or("(not provided)")
                ));
                message.push_str(&format!(
                    "\nMagic Token: {}",
                    reply.magic_token.as_deref().unwrap_or("(not provided)")
                ));
            }
        }
        None => {
            message.push_str(&format!(
                "\n\nCredentials and medical summary have been sent to {}",
                draft.email
            ));
        }
    }

    message
}

fn creation_notice(draft: &PatientDraft, reply: &CreatePatientReply) -> Notice {
    let message = creation_message(draft, reply);
    if reply.warnings.as_ref().is_some_and(|w| w.any()) {
        Notice::warning(message)
    } else {
        Notice::success(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{Call, FakeApi};
    use crate::notice::NoticeLevel;

    fn filled_form() -> PatientForm {
        let mut form = PatientForm::new();
        form.name = "Jane Doe".into();
        form.email = "jane@example.com".into();
        form.patient_id = "JD001".into();
        form.conditions = "asthma, diabetes".into();
        form.allergies = "penicillin".into();
        form.discharge_plan = "Rest for a week".into();
        form.medications[0] = MedicationRow {
            name: "Metformin".into(),
            dosage: "500mg".into(),
            frequency: "twice daily".into(),
        };
        form
    }

    #[tokio::test]
    async fn test_valid_form_sends_one_request_with_parsed_lists() {
        let api = FakeApi::default();
        let mut form = filled_form();

        let outcome = form.submit(&api).await.unwrap();

        let calls = api.calls();
        assert_eq!(calls.len(), 1);
        let Call::CreatePatient(draft) = &calls[0] else {
            panic!("expected create_patient, got {:?}", calls[0]);
        };
        assert_eq!(draft.conditions, vec!["asthma", "diabetes"]);
        assert_eq!(draft.allergies, vec!["penicillin"]);
        assert_eq!(draft.medications.len(), 1);
        assert_eq!(outcome.created.as_deref(), Some("Jane Doe"));
        assert_eq!(outcome.notice.level, NoticeLevel::Success);
        assert!(outcome.notice.text.contains("have been sent to jane@example.com"));
    }

    #[tokio::test]
    async fn test_incomplete_medication_row_is_dropped() {
        let api = FakeApi::default();
        let mut form = filled_form();
        form.add_medication();
        form.medications[1].name = "Lisinopril".into();
        form.medications[1].dosage = "10mg".into();

        form.submit(&api).await.unwrap();

        let Call::CreatePatient(draft) = &api.calls()[0] else {
            panic!("expected create_patient");
        };
        assert_eq!(draft.medications.len(), 1);
        assert_eq!(draft.medications[0].name, "Metformin");
    }

    #[tokio::test]
    async fn test_missing_required_fields_send_nothing() {
        let api = FakeApi::default();
        for clear in [FormField::Name, FormField::Email, FormField::PatientId] {
            let mut form = filled_form();
            form.edit(clear, |v| v.clear());
            assert_eq!(form.submit(&api).await.unwrap_err(), ValidationError::MissingRequired);
            assert!(form.button().enabled);
        }
        assert_eq!(api.call_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_email_sends_nothing() {
        let api = FakeApi::default();
        let mut form = filled_form();
        form.email = "not-an-email".into();

        assert_eq!(form.submit(&api).await.unwrap_err(), ValidationError::InvalidEmail);
        assert_eq!(api.call_count(), 0);
    }

    #[test]
    fn test_button_busy_until_settled() {
        let mut form = filled_form();
        let draft = form.begin_submit().unwrap();
        assert_eq!(form.button().label, SUBMIT_BUSY_LABEL);
        assert!(!form.button().enabled);
        assert_eq!(form.begin_submit().unwrap_err(), ValidationError::Busy);

        let outcome = form.finish_submit(&draft, Err(ApiError::Rejected("Email address already exists".into())));
        assert_eq!(outcome.notice.text, "Error: Email address already exists");
        assert_eq!(outcome.created, None);
        assert_eq!(form.button(), SubmitButton::default());
        // Input survives a failed attempt
        assert_eq!(form.name, "Jane Doe");
    }

    #[tokio::test]
    async fn test_transport_failure_restores_button() {
        let api = FakeApi {
            create_reply: None,
            ..FakeApi::default()
        };
        let mut form = filled_form();

        let outcome = form.submit(&api).await.unwrap();
        assert!(outcome.notice.text.starts_with("Error creating patient: "));
        assert!(form.button().enabled);
    }

    #[tokio::test]
    async fn test_success_resets_the_form() {
        let api = FakeApi::default();
        let mut form = filled_form();
        form.add_medication();

        form.submit(&api).await.unwrap();
        assert!(form.name.is_empty());
        assert_eq!(form.medications, vec![MedicationRow::default()]);
    }

    #[test]
    fn test_email_warning_surfaces_credentials() {
        let draft = filled_form().build_draft().unwrap();
        let reply: CreatePatientReply = serde_json::from_str(
            r#"{"success": true, "password": "s3cret!", "magic_token": "tok-123",
                "warnings": {"letta_agent": true, "email_delivery": true}}"#,
        )
        .unwrap();

        let message = creation_message(&draft, &reply);
        assert!(message.starts_with("Patient agent created successfully for Jane Doe!"));
        assert!(message.contains("AI agent creation failed"));
        assert!(message.contains("\nEmail: jane@example.com"));
        assert!(message.contains("\nPassword: s3cret!"));
        assert!(message.contains("\nMagic Token: tok-123"));
        assert!(!message.contains("have been sent to"));
    }

    #[test]
    fn test_field_checks_follow_edits() {
        let mut form = PatientForm::new();
        form.edit(FormField::PatientId, |v| v.push_str("AB-1"));
        assert!(form.patient_id_check.is_invalid());
        form.edit(FormField::PatientId, |v| v.clear());
        assert_eq!(form.patient_id_check, FieldCheck::Clean);

        form.edit(FormField::Email, |v| v.push_str("jane@"));
        assert!(form.email_check.is_invalid());
        assert_eq!(form.email, "jane@");
    }

    #[test]
    fn test_medication_rows_add_and_remove() {
        let mut form = PatientForm::new();
        form.add_medication();
        form.add_medication();
        assert_eq!(form.medications.len(), 3);
        form.edit(
            FormField::Medication { row: 2, part: MedicationPart::Dosage },
            |v| v.push_str("5mg"),
        );
        assert!(form.remove_medication(1));
        assert_eq!(form.medications[1].dosage, "5mg");
        assert!(!form.remove_medication(7));
    }
}
