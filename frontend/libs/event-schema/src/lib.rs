/// Realtime event schema shared by the social client and its backend
///
/// Every frame on the realtime channel is a JSON text frame with the envelope
/// `{"event": <name>, "data": <payload>}`. The backend pushes `newMessage`,
/// `getOnlineUsers` and `notification`; the client sends `register` after
/// every (re)connect so the backend can add it to the presence registry.
///
/// The payload records here are also the JSON shapes returned by the REST API
/// (`newMessage`, `messages`, `userDetails`), so the client decodes both
/// surfaces with the same types.
use serde::{Deserialize, Serialize};

pub mod events;
pub mod records;

pub use events::{decode_inbound, encode_outbound, InboundEvent, OutboundEvent, RawFrame};
pub use records::{MessageRecord, NotificationKind, NotificationRecord, UserRecord};

/// Errors produced while decoding or encoding realtime frames
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("malformed frame: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("unknown event: {0}")]
    UnknownEvent(String),

    #[error("invalid payload for {event}: {source}")]
    InvalidPayload {
        event: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Standard REST envelope: `{ success, message, ...payload }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub data: T,
}
