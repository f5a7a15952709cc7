/// Failures from a call to the care portal backend.
///
/// `Network` and `Decode` are the transport tier: the request never produced a
/// usable JSON body. `Rejected` is the application tier: the backend answered
/// with `success: false`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{0}")]
    Rejected(String),
}

impl ApiError {
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::Decode(_))
    }
}

/// Client-side input checks that stop a request before it is sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Patient name, email, and ID are required")]
    MissingRequired,

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Please enter an instruction")]
    EmptyInstruction,

    #[error("Please enter a message")]
    EmptyMessage,

    #[error("Patient ID and password are required")]
    MissingCredentials,

    #[error("Please enter your login token")]
    EmptyToken,

    #[error("A request is already in progress")]
    Busy,
}
