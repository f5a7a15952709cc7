use std::collections::HashMap;
use tracing::{info, warn};

use crate::api::{AckReply, CareApi, Envelope};
use crate::error::{ApiError, ValidationError};
use crate::notice::Notice;

/// Per-patient instruction drafts, keyed by patient name
#[derive(Debug, Clone, Default)]
pub struct InstructionBoxes {
    drafts: HashMap<String, String>,
}

impl InstructionBoxes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self, patient: &str) -> &str {
        self.drafts.get(patient).map(String::as_str).unwrap_or("")
    }

    pub fn text_mut(&mut self, patient: &str) -> &mut String {
        self.drafts.entry(patient.to_string()).or_default()
    }

    pub fn forget(&mut self, patient: &str) {
        self.drafts.remove(patient);
    }

    /// The trimmed instruction for `patient`, or an error if there is none
    pub fn begin_send(&self, patient: &str) -> Result<String, ValidationError> {
        let instruction = self.text(patient).trim();
        if instruction.is_empty() {
            return Err(ValidationError::EmptyInstruction);
        }
        Ok(instruction.to_string())
    }

    pub fn finish_send(&mut self, patient: &str, result: Result<AckReply, ApiError>) -> Notice {
        match result.and_then(Envelope::into_result) {
            Ok(_) => {
                info!(patient, "Instruction delivered");
                if let Some(text) = self.drafts.get_mut(patient) {
                    text.clear();
                }
                Notice::success(format!("Instruction sent successfully to {}!", patient))
            }
            Err(ApiError::Rejected(reason)) => {
                warn!(patient, %reason, "Instruction rejected");
                Notice::error(format!("Error: {}", reason))
            }
            Err(e) => {
                warn!(patient, error = %e, "Instruction failed");
                Notice::error(format!("Error sending instruction: {}", e))
            }
        }
    }

    pub async fn send<A: CareApi + ?Sized>(&mut self, api: &A, patient: &str) -> Result<Notice, ValidationError> {
        let instruction = self.begin_send(patient)?;
        let result = api.send_instruction(patient, &instruction).await;
        Ok(self.finish_send(patient, result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{Call, FakeApi};

    #[tokio::test]
    async fn test_sends_trimmed_text_for_matching_patient() {
        let api = FakeApi::default();
        let mut boxes = InstructionBoxes::new();
        boxes.text_mut("Jane Doe").push_str("  Take meds with food  ");
        boxes.text_mut("John Roe").push_str("Walk daily");

        let notice = boxes.send(&api, "Jane Doe").await.unwrap();

        assert_eq!(notice.text, "Instruction sent successfully to Jane Doe!");
        assert_eq!(
            api.calls(),
            vec![Call::SendInstruction {
                patient_name: "Jane Doe".into(),
                instruction: "Take meds with food".into(),
            }]
        );
        assert_eq!(boxes.text("Jane Doe"), "");
        assert_eq!(boxes.text("John Roe"), "Walk daily");
    }

    #[tokio::test]
    async fn test_blank_instruction_is_rejected_locally() {
        let api = FakeApi::default();
        let mut boxes = InstructionBoxes::new();
        boxes.text_mut("Jane Doe").push_str("   ");

        assert_eq!(
            boxes.send(&api, "Jane Doe").await.unwrap_err(),
            ValidationError::EmptyInstruction
        );
        assert_eq!(boxes.send(&api, "Nobody").await.unwrap_err(), ValidationError::EmptyInstruction);
        assert_eq!(api.call_count(), 0);
    }

    #[tokio::test]
    async fn test_failure_keeps_the_text() {
        let api = FakeApi {
            ack_reply: Some(r#"{"error": "Patient or agent not found"}"#.into()),
            ..FakeApi::default()
        };
        let mut boxes = InstructionBoxes::new();
        boxes.text_mut("Jane Doe").push_str("Call the clinic");

        let notice = boxes.send(&api, "Jane Doe").await.unwrap();
        assert_eq!(notice.text, "Error: Patient or agent not found");
        assert_eq!(boxes.text("Jane Doe"), "Call the clinic");
    }
}
