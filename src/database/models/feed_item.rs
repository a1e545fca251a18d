use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::policy::Owned;

/// A status update posted by a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct FeedItem {
    pub id: i64,
    pub owner_id: i64,
    pub status_text: String,
    pub created_at: DateTime<Utc>,
}

impl Owned for FeedItem {
    fn owner_id(&self) -> Option<i64> {
        Some(self.owner_id)
    }
}

#[derive(Debug, Clone)]
pub struct NewFeedItem {
    pub owner_id: i64,
    pub status_text: String,
}
