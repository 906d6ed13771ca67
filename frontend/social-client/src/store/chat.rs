use std::collections::HashMap;

use serde::Serialize;

use super::{Action, Change};
use crate::models::{Conversation, Message, UserId};
use crate::realtime::PresenceSet;

#[derive(Debug, Clone, Default, Serialize)]
pub struct ChatState {
    /// counterpart id -> conversation
    pub conversations: HashMap<UserId, Conversation>,
    /// Compose buffer of the open thread
    pub compose: String,
    pub presence: PresenceSet,
}

impl ChatState {
    pub fn conversation(&self, counterpart_id: &str) -> Option<&Conversation> {
        self.conversations.get(counterpart_id)
    }

    /// Append to the conversation of the non-local participant, creating it if needed
    pub(super) fn append(&mut self, local_user_id: Option<&str>, message: Message) -> Option<Change> {
        let counterpart = message.counterpart(local_user_id).to_string();
        let conversation = self
            .conversations
            .entry(counterpart.clone())
            .or_insert_with(|| Conversation::new(counterpart.clone()));

        if conversation.append(message) {
            Some(Change::Conversation(counterpart))
        } else {
            tracing::debug!(%counterpart, "duplicate message ignored");
            None
        }
    }
}

pub(super) fn reduce(state: &mut ChatState, action: Action) -> Option<Change> {
    match action {
        Action::ConversationLoaded {
            counterpart_id,
            messages,
        } => {
            state
                .conversations
                .entry(counterpart_id.clone())
                .or_insert_with(|| Conversation::new(counterpart_id.clone()))
                .merge_history(messages);
            Some(Change::Conversation(counterpart_id))
        }
        Action::SetCompose(text) => {
            if state.compose == text {
                return None;
            }
            state.compose = text;
            Some(Change::Compose)
        }
        Action::ClearCompose => {
            if state.compose.is_empty() {
                return None;
            }
            state.compose.clear();
            Some(Change::Compose)
        }
        Action::PresenceReplaced(set) => {
            state.presence = set;
            Some(Change::Presence)
        }
        Action::PresenceCleared => {
            if state.presence == PresenceSet::default() {
                return None;
            }
            state.presence = PresenceSet::default();
            Some(Change::Presence)
        }
        _ => None,
    }
}
