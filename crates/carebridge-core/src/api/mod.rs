pub mod http;
pub mod types;

#[cfg(test)]
pub(crate) mod fake;

use async_trait::async_trait;

use crate::error::ApiError;
use crate::state::Session;

pub use http::HttpClient;
pub use types::{
    AckReply, AgentMessage, ChatPayload, ChatReply, CreatePatientReply, CreateWarnings, Envelope,
    HealthStatus, Medication, PatientDraft, SystemStats,
};

/// How a patient proves who they are at login
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatientCredentials {
    Password { patient_id: String, password: String },
    MagicToken(String),
}

/// Calls the front-ends make against the care portal backend.
///
/// Every method returns the decoded reply even when it carries
/// `success: false`; callers decide how to surface application failures.
#[async_trait]
pub trait CareApi: Send + Sync {
    async fn login_nurse(&self) -> Result<Session, ApiError>;
    async fn login_patient(&self, credentials: &PatientCredentials) -> Result<Session, ApiError>;
    async fn logout(&self) -> Result<(), ApiError>;

    async fn create_patient(&self, draft: &PatientDraft) -> Result<CreatePatientReply, ApiError>;
    async fn send_instruction(&self, patient_name: &str, instruction: &str) -> Result<AckReply, ApiError>;
    async fn delete_patient(&self, patient_name: &str) -> Result<AckReply, ApiError>;
    async fn refresh_patient_context(&self, patient_name: &str) -> Result<AckReply, ApiError>;
    async fn clear_alerts(&self) -> Result<AckReply, ApiError>;
    async fn system_stats(&self) -> Result<SystemStats, ApiError>;

    async fn send_message(&self, message: &str) -> Result<ChatReply, ApiError>;

    async fn health(&self) -> Result<HealthStatus, ApiError>;
}
