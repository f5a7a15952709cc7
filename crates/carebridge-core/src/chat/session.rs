use std::time::Instant;
use tracing::{debug, warn};

use super::typing::TypingIndicator;
use crate::api::{CareApi, ChatReply};
use crate::error::{ApiError, ValidationError};
use crate::state::{ChatMessage, ChatRole};

pub const FALLBACK_REPLY: &str = "I received your message. How can I help you today?";
pub const NO_REPLY: &str =
    "I apologize, but I'm having trouble responding right now. Please try again in a moment.";
pub const CONNECTION_APOLOGY: &str =
    "I'm having trouble connecting. Please check your internet connection and try again.";
const EMPTY_CONTENT: &str = "Response received";

/// Marker some agents prepend to their replies
const ASSISTANT_MARKER: &str = "**Assistant:**";

/// Shortcuts offered under the chat input
pub const QUICK_MESSAGES: &[&str] = &[
    "How should I take my medications?",
    "What symptoms should I watch for?",
    "When is my next follow-up?",
    "Please let the nurse know I need help.",
];

/// Text the assistant shows for a settled send, whatever its outcome
pub fn reply_text(result: &Result<ChatReply, ApiError>) -> String {
    match result {
        Ok(reply) => {
            let messages = reply
                .response
                .as_ref()
                .and_then(|r| r.messages.as_ref())
                .filter(|_| reply.success);

            if let Some(messages) = messages {
                return match messages.iter().filter(|m| m.is_assistant_text()).last() {
                    Some(last) => {
                        let content = last.content.as_deref().unwrap_or_default();
                        let cleaned = content.replace(ASSISTANT_MARKER, "");
                        let cleaned = cleaned.trim();
                        if cleaned.is_empty() {
                            EMPTY_CONTENT.to_string()
                        } else {
                            cleaned.to_string()
                        }
                    }
                    None => FALLBACK_REPLY.to_string(),
                };
            }

            match &reply.error {
                Some(error) => format!("I'm sorry, I encountered an error: {}", error),
                None => NO_REPLY.to_string(),
            }
        }
        Err(ApiError::Rejected(reason)) => format!("I'm sorry, I encountered an error: {}", reason),
        Err(_) => CONNECTION_APOLOGY.to_string(),
    }
}

/// Patient chat transcript plus the input line and typing indicator
#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    pub input: String,
    pub typing: TypingIndicator,
    transcript: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.transcript.last()
    }

    pub fn push(&mut self, role: ChatRole, content: impl Into<String>) {
        self.transcript.push(ChatMessage::new(role, content));
    }

    /// Optimistically append the user's message, show the typing indicator
    /// and clear the input. Returns the text to send.
    pub fn begin_send(&mut self, now: Instant) -> Result<String, ValidationError> {
        let message = self.input.trim().to_string();
        if message.is_empty() {
            return Err(ValidationError::EmptyMessage);
        }

        self.typing.show(now);
        self.push(ChatRole::User, message.clone());
        self.input.clear();
        debug!(transcript = self.transcript.len(), "Chat message queued");
        Ok(message)
    }

    /// Append the assistant's side of a settled send and hide the indicator
    pub fn finish_send(&mut self, result: Result<ChatReply, ApiError>) {
        if let Err(e) = &result {
            warn!(error = %e, "Chat send failed");
        }
        let text = reply_text(&result);
        self.push(ChatRole::Assistant, text);
        self.typing.hide();
    }

    /// Put a preset into the input and send it straight away
    pub fn quick_message(&mut self, preset: &str, now: Instant) -> Result<String, ValidationError> {
        self.input = preset.to_string();
        self.begin_send(now)
    }

    pub async fn send<A: CareApi + ?Sized>(&mut self, api: &A, now: Instant) -> Result<(), ValidationError> {
        let message = self.begin_send(now)?;
        let result = api.send_message(&message).await;
        self.finish_send(result);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{transport_error, Call, FakeApi};

    fn reply(json: &str) -> Result<ChatReply, ApiError> {
        Ok(serde_json::from_str(json).unwrap())
    }

    #[tokio::test]
    async fn test_empty_message_sends_nothing() {
        let api = FakeApi::default();
        let mut chat = ChatSession::new();
        chat.push(ChatRole::Assistant, "Hello");
        chat.input = "   \n".into();

        assert_eq!(
            chat.send(&api, Instant::now()).await.unwrap_err(),
            ValidationError::EmptyMessage
        );
        assert_eq!(api.call_count(), 0);
        assert_eq!(chat.transcript().len(), 1);
        assert!(!chat.typing.is_visible());
    }

    #[tokio::test]
    async fn test_last_assistant_message_is_shown() {
        let api = FakeApi {
            chat_reply: Some(
                r#"{"success": true, "response": {"messages": [
                    {"message_type": "assistant_message", "content": "First"},
                    {"message_type": "reasoning_message", "content": "hidden"},
                    {"message_type": "assistant_message", "content": "**Assistant:** Take it with food."},
                    {"message_type": "assistant_message", "content": "  "}
                ]}}"#
                    .into(),
            ),
            ..FakeApi::default()
        };
        let mut chat = ChatSession::new();
        chat.input = " When do I take metformin? ".into();

        chat.send(&api, Instant::now()).await.unwrap();

        assert_eq!(api.calls(), vec![Call::SendMessage("When do I take metformin?".into())]);
        let transcript = chat.transcript();
        assert_eq!(transcript[0], ChatMessage::new(ChatRole::User, "When do I take metformin?"));
        assert_eq!(transcript[1], ChatMessage::new(ChatRole::Assistant, "Take it with food."));
        assert!(chat.input.is_empty());
        assert!(!chat.typing.is_visible());
    }

    #[test]
    fn test_no_qualifying_message_falls_back() {
        let text = reply_text(&reply(
            r#"{"success": true, "response": {"messages": [{"message_type": "tool_call_message"}]}}"#,
        ));
        assert_eq!(text, FALLBACK_REPLY);
        assert!(text.ends_with("How can I help you today?"));
    }

    #[test]
    fn test_application_error_is_apologised_for() {
        let text = reply_text(&reply(r#"{"error": "Patient agent not found"}"#));
        assert_eq!(text, "I'm sorry, I encountered an error: Patient agent not found");

        assert_eq!(reply_text(&reply(r#"{"success": true}"#)), NO_REPLY);
    }

    #[tokio::test]
    async fn test_connectivity_failure_apologises_and_hides_typing() {
        let api = FakeApi {
            chat_reply: None,
            ..FakeApi::default()
        };
        let mut chat = ChatSession::new();
        chat.input = "Are you there?".into();

        chat.send(&api, Instant::now()).await.unwrap();

        assert_eq!(chat.last_message().unwrap().content, CONNECTION_APOLOGY);
        assert!(!chat.typing.is_visible());
        assert_eq!(reply_text(&Err(transport_error())), CONNECTION_APOLOGY);
    }

    #[test]
    fn test_begin_send_is_optimistic() {
        let mut chat = ChatSession::new();
        let sent = chat.quick_message(QUICK_MESSAGES[0], Instant::now()).unwrap();

        assert_eq!(sent, QUICK_MESSAGES[0]);
        assert_eq!(chat.transcript().len(), 1);
        assert_eq!(chat.transcript()[0].role, ChatRole::User);
        assert!(chat.typing.is_visible());
        assert!(chat.input.is_empty());
    }
}
