//! Realtime channel events
//!
//! Frames are decoded in two steps: the envelope first (`RawFrame`), then the
//! payload for the named event. This keeps "unknown event" distinct from
//! "known event with a bad payload", which the client logs differently.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::records::{MessageRecord, NotificationRecord};
use crate::SchemaError;

pub const EVENT_NEW_MESSAGE: &str = "newMessage";
pub const EVENT_ONLINE_USERS: &str = "getOnlineUsers";
pub const EVENT_NOTIFICATION: &str = "notification";
pub const EVENT_REGISTER: &str = "register";

/// `{"event": ..., "data": ...}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawFrame {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

/// Events pushed by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// A message addressed to the connected user
    NewMessage(MessageRecord),
    /// Full replacement set of online user ids
    OnlineUsers(Vec<String>),
    /// Like or dislike on one of the connected user's posts
    Notification(NotificationRecord),
}

impl InboundEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::NewMessage(_) => EVENT_NEW_MESSAGE,
            Self::OnlineUsers(_) => EVENT_ONLINE_USERS,
            Self::Notification(_) => EVENT_NOTIFICATION,
        }
    }
}

/// Events sent by the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundEvent {
    /// Presence registration, sent after every (re)connect
    Register { user_id: String },
}

impl OutboundEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Register { .. } => EVENT_REGISTER,
        }
    }
}

pub fn decode_inbound(text: &str) -> Result<InboundEvent, SchemaError> {
    let frame: RawFrame = serde_json::from_str(text).map_err(SchemaError::Malformed)?;

    fn payload<T: serde::de::DeserializeOwned>(
        event: &'static str,
        data: Value,
    ) -> Result<T, SchemaError> {
        serde_json::from_value(data).map_err(|source| SchemaError::InvalidPayload { event, source })
    }

    match frame.event.as_str() {
        EVENT_NEW_MESSAGE => payload(EVENT_NEW_MESSAGE, frame.data).map(InboundEvent::NewMessage),
        EVENT_ONLINE_USERS => {
            payload(EVENT_ONLINE_USERS, frame.data).map(InboundEvent::OnlineUsers)
        }
        EVENT_NOTIFICATION => {
            payload(EVENT_NOTIFICATION, frame.data).map(InboundEvent::Notification)
        }
        _ => Err(SchemaError::UnknownEvent(frame.event)),
    }
}

pub fn encode_outbound(event: &OutboundEvent) -> String {
    let data = match event {
        OutboundEvent::Register { user_id } => serde_json::json!({ "userId": user_id }),
    };
    let frame = RawFrame {
        event: event.event_type().to_string(),
        data,
    };
    // A RawFrame of a string and a json! value always serializes
    serde_json::to_string(&frame).unwrap_or_default()
}
