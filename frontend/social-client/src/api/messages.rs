use event_schema::MessageRecord;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::ApiClient;
use crate::error::Result;
use crate::models::Message;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendMessageRequest<'a> {
    text_message: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageBody {
    #[serde(rename = "newMessage")]
    pub new_message: MessageRecord,
}

#[derive(Debug, Deserialize)]
pub struct ConversationBody {
    #[serde(default)]
    pub messages: Vec<MessageRecord>,
}

impl ApiClient {
    /// POST `/api/v1/message/send/{receiver_id}`; returns the stored message
    pub async fn send_message(&self, receiver_id: &str, text: &str) -> Result<Message> {
        let request = self
            .post(&["api", "v1", "message", "send", receiver_id])?
            .json(&SendMessageRequest { text_message: text });

        let envelope = self.execute::<SendMessageBody>(request).await?;
        let message = Message::from(envelope.data.new_message);
        info!(message_id = %message.id, receiver_id, "Message sent");
        Ok(message)
    }

    /// GET `/api/v1/message/all/{counterpart_id}`
    pub async fn conversation(&self, counterpart_id: &str) -> Result<Vec<Message>> {
        let request = self.get(&["api", "v1", "message", "all", counterpart_id])?;
        let envelope = self.execute::<ConversationBody>(request).await?;
        Ok(envelope
            .data
            .messages
            .into_iter()
            .map(Message::from)
            .collect())
    }
}
