pub mod session;
pub mod typing;

pub use session::{reply_text, ChatSession, CONNECTION_APOLOGY, FALLBACK_REPLY, NO_REPLY, QUICK_MESSAGES};
pub use typing::{TypingIndicator, TYPING_STEP};
