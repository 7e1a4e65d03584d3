//! Chat models.
//!
//! A chat model consumes a [PromptValue](crate::prompt::chat::PromptValue) and replies with an [AiMessage]. When
//! streaming, each yielded [AiMessage] is a chunk of the reply; [AiMessage::push] glues chunks back together.

pub mod openai;

use std::fmt;
use serde::{Deserialize, Serialize};
use crate::prompt::chat::ChatMessage;

/// Reply of a chat model, or one streamed chunk of it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiMessage {
    pub content: String,
}

impl AiMessage {
    pub fn new(content: impl Into<String>) -> Self {
        Self { content: content.into() }
    }

    /// Append a streamed chunk.
    pub fn push(&mut self, chunk: &AiMessage) {
        self.content.push_str(&chunk.content);
    }
}

impl fmt::Display for AiMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.content)
    }
}

impl From<AiMessage> for ChatMessage {
    fn from(message: AiMessage) -> Self {
        ChatMessage::ai(message.content)
    }
}

#[cfg(test)]
mod test_llm {
    use super::AiMessage;
    use crate::prompt::chat::{ChatMessage, Role};

    #[test]
    fn test_push_chunks() {
        let mut full = AiMessage::default();
        for chunk in ["Cricket", ", ", "Hockey"] {
            full.push(&AiMessage::new(chunk));
        }
        assert_eq!("Cricket, Hockey", full.to_string());
        assert_eq!(Role::Ai, ChatMessage::from(full).role);
    }
}
