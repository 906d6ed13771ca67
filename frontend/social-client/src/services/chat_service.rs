use resilience::{http_read_config, with_retry_if};
use tracing::{debug, error, info};

use crate::api::ApiClient;
use crate::error::{ClientError, Result};
use crate::models::{normalize_text, Message, UserSummary};
use crate::store::{Action, Store};

/// Locally initiated chat mutations
#[derive(Clone)]
pub struct ChatService {
    api: ApiClient,
    store: Store,
}

impl ChatService {
    pub fn new(api: ApiClient, store: Store) -> Self {
        Self { api, store }
    }

    pub fn set_draft(&self, text: impl Into<String>) {
        self.store.dispatch(Action::SetCompose(text.into()));
    }

    pub fn draft(&self) -> String {
        self.store.select(|s| s.chat.compose.clone())
    }

    /// Send `text` to `receiver_id`.
    ///
    /// Blank text issues no request and returns `Ok(None)`. The message is
    /// appended and the compose buffer cleared only once the backend confirms;
    /// on failure both are left untouched.
    pub async fn send_message(&self, receiver_id: &str, text: &str) -> Result<Option<Message>> {
        let Some(text) = normalize_text(text) else {
            debug!(receiver_id, "Empty message not sent");
            return Ok(None);
        };

        if self.store.session_user_id().is_none() {
            return Err(ClientError::NoSession);
        }

        let message = match self.api.send_message(receiver_id, &text).await {
            Ok(message) => message,
            Err(e) => {
                error!(receiver_id, error = %e, "Failed to send message");
                return Err(e);
            }
        };

        self.store.dispatch(Action::MessageAppended(message.clone()));
        self.store.dispatch(Action::ClearCompose);
        Ok(Some(message))
    }

    /// Send whatever is in the compose buffer
    pub async fn send_draft(&self, receiver_id: &str) -> Result<Option<Message>> {
        let draft = self.draft();
        self.send_message(receiver_id, &draft).await
    }

    /// Fetch the full history with `counterpart_id` and replace the local copy
    pub async fn load_conversation(&self, counterpart_id: &str) -> Result<usize> {
        let messages = with_retry_if(
            http_read_config().retry,
            || self.api.conversation(counterpart_id),
            ClientError::is_retryable,
        )
        .await
        .map_err(|e| {
            let e = e.into_inner();
            error!(counterpart_id, error = %e, "Failed to load conversation");
            e
        })?;

        let count = messages.len();
        self.store.dispatch(Action::ConversationLoaded {
            counterpart_id: counterpart_id.to_string(),
            messages,
        });
        debug!(counterpart_id, count, "Conversation loaded");
        Ok(count)
    }

    pub fn select_user(&self, user: Option<UserSummary>) {
        self.store.dispatch(Action::SelectUser(user));
    }

    /// Leaving the chat view forgets the open thread
    pub fn leave_chat(&self) {
        self.store.dispatch(Action::SelectUser(None));
    }

    pub async fn load_suggested_users(&self) -> Result<usize> {
        let users = with_retry_if(
            http_read_config().retry,
            || self.api.suggested_users(),
            ClientError::is_retryable,
        )
        .await
        .map_err(|e| e.into_inner())?;

        let count = users.len();
        self.store.dispatch(Action::SetSuggestedUsers(users));
        info!(count, "Suggested users loaded");
        Ok(count)
    }
}
