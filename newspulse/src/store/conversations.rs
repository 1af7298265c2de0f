use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// ChatMessage represents a single message in a stored conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationHistory {
    pub user_id: String,
    pub messages: Vec<ChatMessage>,
}

/// Per-user chat histories. Histories grow without bound and are never evicted.
#[derive(Debug, Default)]
pub struct ConversationStore {
    conversations: HashMap<String, ConversationHistory>,
}

impl ConversationStore {
    /// Replaces the whole history of `user_id`.
    pub fn save(&mut self, user_id: &str, messages: Vec<ChatMessage>) {
        self.conversations.insert(
            user_id.to_string(),
            ConversationHistory {
                user_id: user_id.to_string(),
                messages,
            },
        );
    }

    pub fn append(&mut self, user_id: &str, role: MessageRole, content: &str) -> ChatMessage {
        let message = ChatMessage::new(role, content);
        self.conversations
            .entry(user_id.to_string())
            .or_insert_with(|| ConversationHistory {
                user_id: user_id.to_string(),
                messages: Vec::new(),
            })
            .messages
            .push(message.clone());
        message
    }

    pub fn get(&self, user_id: &str) -> Vec<ChatMessage> {
        self.conversations
            .get(user_id)
            .map(|c| c.messages.clone())
            .unwrap_or_default()
    }

    pub fn clear(&mut self, user_id: &str) {
        self.conversations.remove(user_id);
    }

    pub fn all(&self) -> Vec<ConversationHistory> {
        self.conversations.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_then_clear() {
        let mut store = ConversationStore::default();
        store.append("alice", MessageRole::User, "What moved oil prices?");
        let reply = store.append("alice", MessageRole::Assistant, "OPEC cut production.");

        let history = store.get("alice");
        assert_eq!(history.len(), 2);
        assert_eq!(history[1], reply);
        assert_eq!(history[0].role, MessageRole::User);
        assert_ne!(history[0].id, history[1].id);

        store.clear("alice");
        assert!(store.get("alice").is_empty());
        assert!(store.all().is_empty());
    }

    #[test]
    fn save_replaces_history() {
        let mut store = ConversationStore::default();
        store.append("bob", MessageRole::User, "first");
        store.save("bob", vec![ChatMessage::new(MessageRole::Assistant, "replacement")]);

        let history = store.get("bob");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].content, "replacement");
        assert!(store.get("nobody").is_empty());
    }
}
