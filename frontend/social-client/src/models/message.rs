use chrono::{DateTime, Utc};
use event_schema::MessageRecord;
use serde::{Deserialize, Serialize};

use super::{MessageId, UserId};

/// A direct message. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub text: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl Message {
    /// The participant that is not `local_user_id`.
    ///
    /// Falls back to the sender when neither side is the local user, which is
    /// how an inbound message is keyed before a session is known.
    pub fn counterpart<'a>(&'a self, local_user_id: Option<&str>) -> &'a str {
        match local_user_id {
            Some(me) if self.sender_id == me => &self.receiver_id,
            _ => &self.sender_id,
        }
    }
}

impl From<MessageRecord> for Message {
    fn from(record: MessageRecord) -> Self {
        Self {
            id: record.id,
            sender_id: record.sender_id,
            receiver_id: record.receiver_id,
            text: record.text,
            created_at: record.created_at,
        }
    }
}

/// Messages exchanged with one counterpart, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Conversation {
    pub counterpart_id: UserId,
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new(counterpart_id: impl Into<UserId>) -> Self {
        Self {
            counterpart_id: counterpart_id.into(),
            messages: Vec::new(),
        }
    }

    /// Append unless a message with the same id is already present.
    /// Returns whether the conversation changed.
    pub fn append(&mut self, message: Message) -> bool {
        if self.contains(&message.id) {
            return false;
        }
        self.messages.push(message);
        true
    }

    /// Merge a server history snapshot.
    ///
    /// The snapshot comes first in server order; local messages it does not
    /// contain (delivered while the snapshot was in flight) follow in their
    /// original order. Repeated ids are dropped.
    pub fn merge_history(&mut self, snapshot: Vec<Message>) {
        let local = std::mem::take(&mut self.messages);
        for message in snapshot.into_iter().chain(local) {
            self.append(message);
        }
    }

    pub fn contains(&self, message_id: &str) -> bool {
        self.messages.iter().any(|m| m.id == message_id)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Normalization shared by every compose box (direct messages, comments):
/// surrounding whitespace is trimmed and an empty result means "nothing to send".
pub fn normalize_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
