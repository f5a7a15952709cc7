pub mod api;
pub mod chat;
pub mod config;
pub mod connectivity;
pub mod dashboard;
pub mod error;
pub mod login;
pub mod notice;
pub mod state;
pub mod toast;
pub mod validation;

// Re-export main types for convenience
pub use api::{CareApi, HttpClient, PatientCredentials, PatientDraft};
pub use chat::ChatSession;
pub use config::Config;
pub use connectivity::{ConnectivityChange, ConnectivityMonitor};
pub use dashboard::Dashboard;
pub use error::{ApiError, ValidationError};
pub use login::{LoginForm, LoginMode, LoginRequest};
pub use notice::{Notice, NoticeLevel};
pub use state::{ChatMessage, ChatRole, Session};
pub use toast::Toasts;
