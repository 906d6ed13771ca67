use chrono::{DateTime, Utc};
use event_schema::NotificationRecord;
use serde::Serialize;
use uuid::Uuid;

pub use event_schema::NotificationKind;

use super::{PostId, UserId, UserSummary};

/// Client-assigned id; the backend does not identify notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NotificationId(Uuid);

impl NotificationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NotificationId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LikeNotification {
    pub id: NotificationId,
    pub actor_user_id: UserId,
    pub actor_profile: Option<UserSummary>,
    pub post_id: PostId,
    pub kind: NotificationKind,
    pub message: Option<String>,
    pub received_at: DateTime<Utc>,
}

impl LikeNotification {
    /// Same actor acting on the same post
    pub fn same_subject(&self, other: &LikeNotification) -> bool {
        self.actor_user_id == other.actor_user_id && self.post_id == other.post_id
    }
}

impl From<NotificationRecord> for LikeNotification {
    fn from(record: NotificationRecord) -> Self {
        Self {
            id: NotificationId::new(),
            actor_user_id: record.user_id,
            actor_profile: record.user_details.map(UserSummary::from),
            post_id: record.post_id,
            kind: record.kind,
            message: record.message,
            received_at: Utc::now(),
        }
    }
}
