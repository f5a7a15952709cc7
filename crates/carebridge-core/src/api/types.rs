use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// A single medication line of a patient draft
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medication {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
}

/// Body of `POST /api/create_patient`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientDraft {
    pub name: String,
    pub email: String,
    pub patient_id: String,
    pub conditions: Vec<String>,
    pub medications: Vec<Medication>,
    pub allergies: Vec<String>,
    pub discharge_plan: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InstructionRequest<'a> {
    pub patient_name: &'a str,
    pub instruction: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteRequest<'a> {
    pub patient_name: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
}

/// Replies carrying the `{ success, error }` envelope
pub trait Envelope: Sized {
    fn success(&self) -> bool;
    fn error(&self) -> Option<&str>;

    /// Turn an application-level failure into `ApiError::Rejected`
    fn into_result(self) -> Result<Self, ApiError> {
        if self.success() {
            Ok(self)
        } else {
            let reason = self.error().unwrap_or("Unknown error").to_string();
            Err(ApiError::Rejected(reason))
        }
    }
}

/// Services that failed while the backend created the patient
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CreateWarnings {
    #[serde(default)]
    pub letta_agent: bool,
    #[serde(default)]
    pub email_delivery: bool,
}

impl CreateWarnings {
    pub fn any(&self) -> bool {
        self.letta_agent || self.email_delivery
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatePatientReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub agent_id: Option<String>,
    #[serde(default)]
    pub warnings: Option<CreateWarnings>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub magic_token: Option<String>,
}

/// Reply of endpoints that only acknowledge the request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AckReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// One message produced by the patient's agent
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AgentMessage {
    #[serde(default)]
    pub message_type: String,
    #[serde(default)]
    pub content: Option<String>,
}

impl AgentMessage {
    pub fn is_assistant_text(&self) -> bool {
        self.message_type == "assistant_message"
            && self.content.as_deref().is_some_and(|c| !c.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatPayload {
    #[serde(default)]
    pub messages: Option<Vec<AgentMessage>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub response: Option<ChatPayload>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SystemStats {
    #[serde(default)]
    pub total_patients: u32,
    #[serde(default)]
    pub active_agents: u32,
    #[serde(default)]
    pub total_alerts: u32,
    #[serde(default)]
    pub high_priority_alerts: u32,
    #[serde(default)]
    pub total_instructions: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub letta_client: bool,
    #[serde(default)]
    pub storage: bool,
    #[serde(default)]
    pub email_service: bool,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

macro_rules! impl_envelope {
    ($($reply:ty),*) => {
        $(impl Envelope for $reply {
            fn success(&self) -> bool {
                self.success
            }

            fn error(&self) -> Option<&str> {
                self.error.as_deref()
            }
        })*
    };
}

impl_envelope!(CreatePatientReply, AckReply, ChatReply);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_shape_without_success_field() {
        let reply: AckReply = serde_json::from_str(r#"{"error": "Patient not found"}"#).unwrap();
        match reply.into_result() {
            Err(ApiError::Rejected(reason)) => assert_eq!(reason, "Patient not found"),
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_rejection_without_error_text() {
        let reply: AckReply = serde_json::from_str(r#"{"success": false}"#).unwrap();
        let err = reply.into_result().unwrap_err();
        assert_eq!(err.to_string(), "Unknown error");
    }

    #[test]
    fn test_create_reply_with_warnings() {
        let reply: CreatePatientReply = serde_json::from_str(
            r#"{"success": true, "agent_id": null, "email_sent": false,
                "password": "pw", "magic_token": "tok",
                "warnings": {"letta_agent": true, "email_delivery": true}}"#,
        )
        .unwrap();
        let warnings = reply.warnings.clone().unwrap();
        assert!(warnings.letta_agent && warnings.email_delivery);
        assert_eq!(reply.password.as_deref(), Some("pw"));
        assert!(reply.into_result().is_ok());
    }

    #[test]
    fn test_assistant_text_filter() {
        let msg = |t: &str, c: Option<&str>| AgentMessage {
            message_type: t.to_string(),
            content: c.map(str::to_string),
        };
        assert!(msg("assistant_message", Some("Hello")).is_assistant_text());
        assert!(!msg("assistant_message", Some("   ")).is_assistant_text());
        assert!(!msg("assistant_message", None).is_assistant_text());
        assert!(!msg("reasoning_message", Some("thinking")).is_assistant_text());
    }

    #[test]
    fn test_draft_serializes_wire_names() {
        let draft = PatientDraft {
            name: "Ann".into(),
            email: "ann@example.com".into(),
            patient_id: "A1".into(),
            conditions: vec!["asthma".into()],
            medications: vec![Medication {
                name: "Albuterol".into(),
                dosage: "90mcg".into(),
                frequency: "as needed".into(),
            }],
            allergies: vec![],
            discharge_plan: String::new(),
        };
        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(value["patient_id"], "A1");
        assert_eq!(value["medications"][0]["frequency"], "as needed");
        assert_eq!(value["allergies"], serde_json::json!([]));
    }
}
