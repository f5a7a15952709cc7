//! Scripted in-memory backend for controller tests

use async_trait::async_trait;
use std::sync::Mutex;

use super::{
    AckReply, CareApi, ChatReply, CreatePatientReply, HealthStatus, PatientCredentials, PatientDraft,
    SystemStats,
};
use crate::error::ApiError;
use crate::state::Session;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    LoginNurse,
    LoginPatient(PatientCredentials),
    Logout,
    CreatePatient(PatientDraft),
    SendInstruction { patient_name: String, instruction: String },
    DeletePatient(String),
    RefreshContext(String),
    ClearAlerts,
    SystemStats,
    SendMessage(String),
    Health,
}

/// A decode failure stands in for any transport-tier error
pub fn transport_error() -> ApiError {
    ApiError::Decode(serde_json::from_str::<serde_json::Value>("<html>").unwrap_err())
}

fn parse<T: serde::de::DeserializeOwned>(json: &str) -> Result<T, ApiError> {
    Ok(serde_json::from_str(json)?)
}

/// Each endpoint answers with the JSON body configured for it, or with a
/// transport error when the body is `None`.
pub struct FakeApi {
    pub calls: Mutex<Vec<Call>>,
    pub create_reply: Option<String>,
    pub ack_reply: Option<String>,
    pub chat_reply: Option<String>,
    pub stats_reply: Option<String>,
    pub health_reply: Option<String>,
}

impl Default for FakeApi {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            create_reply: Some(
                r#"{"success": true, "warnings": {"letta_agent": false, "email_delivery": false}}"#.into(),
            ),
            ack_reply: Some(r#"{"success": true}"#.into()),
            chat_reply: Some(r#"{"success": true, "response": {"messages": []}}"#.into()),
            stats_reply: Some(r#"{"total_patients": 1}"#.into()),
            health_reply: Some(r#"{"status": "healthy"}"#.into()),
        }
    }
}

impl FakeApi {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn answer<T: serde::de::DeserializeOwned>(reply: &Option<String>) -> Result<T, ApiError> {
        match reply {
            Some(json) => parse(json),
            None => Err(transport_error()),
        }
    }
}

#[async_trait]
impl CareApi for FakeApi {
    async fn login_nurse(&self) -> Result<Session, ApiError> {
        self.record(Call::LoginNurse);
        Ok(Session::Nurse)
    }

    async fn login_patient(&self, credentials: &PatientCredentials) -> Result<Session, ApiError> {
        self.record(Call::LoginPatient(credentials.clone()));
        match credentials {
            PatientCredentials::Password { patient_id, .. } => Ok(Session::Patient {
                patient_id: patient_id.clone(),
            }),
            PatientCredentials::MagicToken(_) => Ok(Session::Patient {
                patient_id: "P1".to_string(),
            }),
        }
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.record(Call::Logout);
        Ok(())
    }

    async fn create_patient(&self, draft: &PatientDraft) -> Result<CreatePatientReply, ApiError> {
        self.record(Call::CreatePatient(draft.clone()));
        Self::answer(&self.create_reply)
    }

    async fn send_instruction(&self, patient_name: &str, instruction: &str) -> Result<AckReply, ApiError> {
        self.record(Call::SendInstruction {
            patient_name: patient_name.to_string(),
            instruction: instruction.to_string(),
        });
        Self::answer(&self.ack_reply)
    }

    async fn delete_patient(&self, patient_name: &str) -> Result<AckReply, ApiError> {
        self.record(Call::DeletePatient(patient_name.to_string()));
        Self::answer(&self.ack_reply)
    }

    async fn refresh_patient_context(&self, patient_name: &str) -> Result<AckReply, ApiError> {
        self.record(Call::RefreshContext(patient_name.to_string()));
        Self::answer(&self.ack_reply)
    }

    async fn clear_alerts(&self) -> Result<AckReply, ApiError> {
        self.record(Call::ClearAlerts);
        Self::answer(&self.ack_reply)
    }

    async fn system_stats(&self) -> Result<SystemStats, ApiError> {
        self.record(Call::SystemStats);
        Self::answer(&self.stats_reply)
    }

    async fn send_message(&self, message: &str) -> Result<ChatReply, ApiError> {
        self.record(Call::SendMessage(message.to_string()));
        Self::answer(&self.chat_reply)
    }

    async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.record(Call::Health);
        Self::answer(&self.health_reply)
    }
}
