use event_schema::UserRecord;
use serde::Deserialize;

use super::{Ack, ApiClient};
use crate::error::Result;
use crate::models::UserSummary;

#[derive(Debug, Deserialize)]
pub struct SuggestedUsersBody {
    #[serde(default)]
    pub users: Vec<UserRecord>,
}

impl ApiClient {
    /// GET `/api/v1/user/suggested`
    pub async fn suggested_users(&self) -> Result<Vec<UserSummary>> {
        let request = self.get(&["api", "v1", "user", "suggested"])?;
        let envelope = self.execute::<SuggestedUsersBody>(request).await?;
        Ok(envelope
            .data
            .users
            .into_iter()
            .map(UserSummary::from)
            .collect())
    }

    /// GET `/api/v1/user/logout`
    pub async fn logout(&self) -> Result<Option<String>> {
        let request = self.get(&["api", "v1", "user", "logout"])?;
        let envelope = self.execute::<Ack>(request).await?;
        Ok(envelope.message)
    }
}
