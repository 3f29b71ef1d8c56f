//! Conversation message types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Opaque message identifier, stable for the message's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Who authored a message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Whether a message's text is settled.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MessageStatus {
    Final,
    /// Only assistant messages awaiting or receiving stream data.
    Pending,
}

/// A single entry in the conversation history.
///
/// User messages are created final and never change. Assistant messages start
/// pending with empty text and are filled by the conversation engine until
/// they are finalized.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    id: MessageId,
    role: Role,
    text: String,
    created_at: DateTime<Utc>,
    status: MessageStatus,
}

impl Message {
    /// Create a final user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            role: Role::User,
            text: text.into(),
            created_at: Utc::now(),
            status: MessageStatus::Final,
        }
    }

    /// Create an empty, pending assistant message.
    pub fn pending_assistant() -> Self {
        Self {
            id: MessageId::new(),
            role: Role::Assistant,
            text: String::new(),
            created_at: Utc::now(),
            status: MessageStatus::Pending,
        }
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn status(&self) -> MessageStatus {
        self.status
    }

    pub fn is_pending(&self) -> bool {
        self.status == MessageStatus::Pending
    }

    /// Replace the text of a pending message with a newer cumulative snapshot.
    ///
    /// Returns `false` (and leaves the message untouched) when the message is
    /// already final or the snapshot would shorten the text.
    pub(crate) fn replace_pending_text(&mut self, text: &str) -> bool {
        if !self.is_pending() || text.len() < self.text.len() {
            return false;
        }
        self.text.clear();
        self.text.push_str(text);
        true
    }

    /// Settle a pending message with its final text.
    pub(crate) fn finalize(&mut self, text: impl Into<String>) -> bool {
        if !self.is_pending() {
            return false;
        }
        self.text = text.into();
        self.status = MessageStatus::Final;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_is_final() {
        let mut msg = Message::user("hello");
        assert_eq!(msg.role(), Role::User);
        assert_eq!(msg.status(), MessageStatus::Final);
        assert!(!msg.replace_pending_text("hello there"));
        assert!(!msg.finalize("changed"));
        assert_eq!(msg.text(), "hello");
    }

    #[test]
    fn pending_text_never_shrinks() {
        let mut msg = Message::pending_assistant();
        assert!(msg.replace_pending_text("Bon"));
        assert!(msg.replace_pending_text("Bonjour"));
        assert!(!msg.replace_pending_text("Bon"));
        assert_eq!(msg.text(), "Bonjour");
        assert!(msg.is_pending());
    }

    #[test]
    fn finalize_settles_once() {
        let mut msg = Message::pending_assistant();
        assert!(msg.finalize("done"));
        assert_eq!(msg.status(), MessageStatus::Final);
        assert!(!msg.finalize("again"));
        assert_eq!(msg.text(), "done");
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(Message::user("a").id(), Message::user("a").id());
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_value(Role::Assistant).unwrap();
        assert_eq!(json, serde_json::json!("assistant"));
        assert_eq!("user".parse::<Role>().unwrap(), Role::User);
    }
}
