use chrono::Utc;
use log::debug;
use crate::models::chat::{ ChatMessage, Role };

/// Append-only record of one page session's turns. Kept in memory only and
/// never fed back into prompts.
#[derive(Debug, Default, Clone)]
pub struct ConversationHistory {
    messages: Vec<ChatMessage>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_message(&mut self, role: Role, content: &str) {
        self.messages.push(ChatMessage {
            role,
            content: content.to_string(),
            timestamp: Utc::now().timestamp(),
        });
        debug!("Conversation history now holds {} message(s)", self.messages.len());
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
