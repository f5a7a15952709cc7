use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::types::{ChatRequest, DeleteRequest, InstructionRequest};
use super::{
    AckReply, CareApi, ChatReply, CreatePatientReply, HealthStatus, PatientCredentials, PatientDraft,
    SystemStats,
};
use crate::error::ApiError;
use crate::state::Session;

/// reqwest-backed client for the care portal backend.
///
/// Holds the session cookie jar, so one instance represents one logged-in
/// user. Cloning shares the jar.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base_url: Url,
}

impl HttpClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| anyhow!("Invalid server URL {:?}: {}", base_url, e))?;

        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(anyhow!("Server URL must be http(s): {}", base_url));
        }

        let client = Client::builder().cookie_store(true).build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn login_form(&self, path: &str, form: &[(&str, &str)]) -> Result<Url, ApiError> {
        let response = self
            .client
            .post(self.endpoint(&[path]))
            .form(form)
            .send()
            .await?;

        // The backend answers logins with a redirect; where it lands says
        // whether the login was accepted.
        Ok(response.url().clone())
    }

    /// True when `landed` is the backend page `page`, under the base path
    fn is_page(&self, landed: &Url, page: &str) -> bool {
        landed.path().trim_end_matches('/') == self.endpoint(&[page]).path()
    }

    /// Patient id from a `{base}/patient/{id}` landing page
    fn patient_page<'a>(&self, landed: &'a Url) -> Option<&'a str> {
        let prefix = format!("{}/", self.endpoint(&["patient"]).path());
        segments_after(landed, &prefix).filter(|id| !id.contains('/'))
    }
}

/// Decode a JSON body whatever the status code, as error replies carry
/// `{ "error": ... }` with a 4xx/5xx status.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.text().await?;
    debug!(%status, bytes = body.len(), "Decoding backend reply");
    Ok(serde_json::from_str(&body)?)
}

/// Decode a body that has no envelope of its own, turning an error status
/// into a rejection instead of an all-default value.
async fn decode_plain<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    if status.is_success() {
        return decode(response).await;
    }

    let reply: AckReply = decode(response).await?;
    Err(ApiError::Rejected(
        reply.error.unwrap_or_else(|| status_reason(status)),
    ))
}

fn status_reason(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.to_string())
}

fn segments_after<'a>(url: &'a Url, prefix: &str) -> Option<&'a str> {
    url.path()
        .strip_prefix(prefix)
        .map(|rest| rest.trim_end_matches('/'))
        .filter(|rest| !rest.is_empty())
}

#[async_trait]
impl CareApi for HttpClient {
    async fn login_nurse(&self) -> Result<Session, ApiError> {
        let landed = self.login_form("login", &[("role", "nurse")]).await?;

        if self.is_page(&landed, "nurse") {
            info!("Nurse session established");
            Ok(Session::Nurse)
        } else {
            warn!(landed = %landed.path(), "Nurse login was not accepted");
            Err(ApiError::Rejected("Nurse login was not accepted".to_string()))
        }
    }

    async fn login_patient(&self, credentials: &PatientCredentials) -> Result<Session, ApiError> {
        let landed = match credentials {
            PatientCredentials::Password { patient_id, password } => {
                self.login_form(
                    "patient-login",
                    &[("patient_id", patient_id.as_str()), ("password", password.as_str())],
                )
                .await?
            }
            PatientCredentials::MagicToken(token) => {
                self.login_form("magic-login", &[("token", token.as_str())]).await?
            }
        };

        match self.patient_page(&landed) {
            Some(patient_id) => {
                info!(patient_id, "Patient session established");
                Ok(Session::Patient {
                    patient_id: patient_id.to_string(),
                })
            }
            None => {
                warn!(landed = %landed.path(), "Patient login was not accepted");
                Err(ApiError::Rejected(
                    "Login failed. Please check your credentials and try again.".to_string(),
                ))
            }
        }
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.client.get(self.endpoint(&["logout"])).send().await?;
        info!("Session closed");
        Ok(())
    }

    async fn create_patient(&self, draft: &PatientDraft) -> Result<CreatePatientReply, ApiError> {
        debug!(patient_id = %draft.patient_id, medications = draft.medications.len(), "POST create_patient");
        let response = self
            .client
            .post(self.endpoint(&["api", "create_patient"]))
            .json(draft)
            .send()
            .await?;
        decode(response).await
    }

    async fn send_instruction(&self, patient_name: &str, instruction: &str) -> Result<AckReply, ApiError> {
        debug!(patient_name, "POST send_instruction");
        let response = self
            .client
            .post(self.endpoint(&["api", "send_instruction"]))
            .json(&InstructionRequest {
                patient_name,
                instruction,
            })
            .send()
            .await?;
        decode(response).await
    }

    async fn delete_patient(&self, patient_name: &str) -> Result<AckReply, ApiError> {
        debug!(patient_name, "DELETE delete_patient");
        let response = self
            .client
            .delete(self.endpoint(&["api", "delete_patient"]))
            .json(&DeleteRequest { patient_name })
            .send()
            .await?;
        decode(response).await
    }

    async fn refresh_patient_context(&self, patient_name: &str) -> Result<AckReply, ApiError> {
        debug!(patient_name, "POST refresh_patient_context");
        let response = self
            .client
            .post(self.endpoint(&["api", "refresh_patient_context", patient_name]))
            .send()
            .await?;
        decode(response).await
    }

    async fn clear_alerts(&self) -> Result<AckReply, ApiError> {
        let response = self
            .client
            .post(self.endpoint(&["api", "alerts", "clear"]))
            .send()
            .await?;
        decode(response).await
    }

    async fn system_stats(&self) -> Result<SystemStats, ApiError> {
        let response = self
            .client
            .get(self.endpoint(&["api", "system", "stats"]))
            .send()
            .await?;
        decode_plain(response).await
    }

    async fn send_message(&self, message: &str) -> Result<ChatReply, ApiError> {
        debug!(chars = message.chars().count(), "POST send_message");
        let response = self
            .client
            .post(self.endpoint(&["api", "send_message"]))
            .json(&ChatRequest { message })
            .send()
            .await?;
        decode(response).await
    }

    async fn health(&self) -> Result<HealthStatus, ApiError> {
        let response = self.client.get(self.endpoint(&["health"])).send().await?;
        decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_http_urls() {
        assert!(HttpClient::new("mailto:nurse@example.com").is_err());
        assert!(HttpClient::new("not a url").is_err());
        assert!(HttpClient::new("http://localhost:5011").is_ok());
    }

    #[test]
    fn test_endpoint_keeps_base_path_and_escapes_names() {
        let client = HttpClient::new("http://care.local/portal/").unwrap();
        let url = client.endpoint(&["api", "refresh_patient_context", "Jane Doe"]);
        assert_eq!(url.as_str(), "http://care.local/portal/api/refresh_patient_context/Jane%20Doe");
    }

    #[test]
    fn test_landing_pages_respect_base_path() {
        let client = HttpClient::new("http://care.local/portal/").unwrap();
        let url = |s: &str| Url::parse(s).unwrap();

        assert!(client.is_page(&url("http://care.local/portal/nurse"), "nurse"));
        assert!(client.is_page(&url("http://care.local/portal/nurse/"), "nurse"));
        assert!(!client.is_page(&url("http://care.local/nurse"), "nurse"));
        assert!(!client.is_page(&url("http://care.local/portal/nurseryXYZ"), "nurse"));

        assert_eq!(client.patient_page(&url("http://care.local/portal/patient/JD001")), Some("JD001"));
        assert_eq!(client.patient_page(&url("http://care.local/patient/JD001")), None);
        assert_eq!(client.patient_page(&url("http://care.local/portal/patient/JD001/extra")), None);
        assert_eq!(client.patient_page(&url("http://care.local/portal/")), None);
    }

    #[test]
    fn test_patient_id_from_redirect_target() {
        let landed = Url::parse("http://care.local/patient/P123").unwrap();
        assert_eq!(segments_after(&landed, "/patient/"), Some("P123"));

        let home = Url::parse("http://care.local/").unwrap();
        assert_eq!(segments_after(&home, "/patient/"), None);
    }
}
