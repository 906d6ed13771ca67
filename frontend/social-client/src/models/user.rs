use event_schema::UserRecord;
use serde::{Deserialize, Serialize};

use super::UserId;

/// The authenticated local user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserId,
    pub username: String,
    pub profile_picture: Option<String>,
}

/// Public profile of another user (counterparts, authors, notification actors)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    #[serde(rename = "_id")]
    pub id: UserId,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
}

impl From<UserRecord> for UserSummary {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            username: record.username,
            profile_picture: record.profile_picture,
        }
    }
}
