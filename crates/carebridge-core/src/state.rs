//! UI-agnostic application state types
//!
//! Data structures shared by any front-end driving the portal (the terminal UI
//! today) that don't depend on a specific UI framework.

use serde::{Deserialize, Serialize};

/// One entry of the chat transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Prefix shown before the message text
    pub fn label(&self) -> &'static str {
        match self.role {
            ChatRole::User => "You:",
            ChatRole::Assistant => "Assistant:",
            ChatRole::Nurse => "Nurse:",
        }
    }
}

/// Who authored a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatRole {
    User,
    Assistant,
    Nurse,
}

/// Authenticated role of the current session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    Nurse,
    Patient { patient_id: String },
}

impl Session {
    pub fn is_nurse(&self) -> bool {
        matches!(self, Session::Nurse)
    }
}
