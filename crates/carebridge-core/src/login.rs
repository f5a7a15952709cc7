use tracing::warn;

use crate::api::{CareApi, PatientCredentials};
use crate::error::{ApiError, ValidationError};
use crate::state::Session;

/// Which login the user picked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginMode {
    #[default]
    Nurse,
    PatientPassword,
    PatientToken,
}

impl LoginMode {
    pub fn all() -> [LoginMode; 3] {
        [LoginMode::Nurse, LoginMode::PatientPassword, LoginMode::PatientToken]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            LoginMode::Nurse => "Nurse dashboard",
            LoginMode::PatientPassword => "Patient (ID + password)",
            LoginMode::PatientToken => "Patient (login token)",
        }
    }
}

/// A login ready to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginRequest {
    Nurse,
    Patient(PatientCredentials),
}

impl LoginRequest {
    pub async fn send<A: CareApi + ?Sized>(&self, api: &A) -> Result<Session, ApiError> {
        let result = match self {
            LoginRequest::Nurse => api.login_nurse().await,
            LoginRequest::Patient(credentials) => api.login_patient(credentials).await,
        };
        if let Err(e) = &result {
            warn!(error = %e, "Login failed");
        }
        result
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub mode: LoginMode,
    pub patient_id: String,
    pub password: String,
    pub token: String,
}

impl LoginForm {
    pub fn with_patient_id(patient_id: Option<String>) -> Self {
        Self {
            patient_id: patient_id.unwrap_or_default(),
            ..Self::default()
        }
    }

    pub fn request(&self) -> Result<LoginRequest, ValidationError> {
        match self.mode {
            LoginMode::Nurse => Ok(LoginRequest::Nurse),
            LoginMode::PatientPassword => {
                let patient_id = self.patient_id.trim();
                if patient_id.is_empty() || self.password.is_empty() {
                    return Err(ValidationError::MissingCredentials);
                }
                Ok(LoginRequest::Patient(PatientCredentials::Password {
                    patient_id: patient_id.to_string(),
                    password: self.password.clone(),
                }))
            }
            LoginMode::PatientToken => {
                let token = self.token.trim();
                if token.is_empty() {
                    return Err(ValidationError::EmptyToken);
                }
                Ok(LoginRequest::Patient(PatientCredentials::MagicToken(token.to_string())))
            }
        }
    }

    /// Forget typed secrets once they have been used
    pub fn clear_secrets(&mut self) {
        self.password.clear();
        self.token.clear();
    }
}
