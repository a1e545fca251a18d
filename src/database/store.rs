use async_trait::async_trait;

use crate::config::StoreBackend;
use crate::filter::SearchFilter;

use super::manager::DatabaseError;
use super::models::{FeedItem, NewFeedItem, NewUser, User, UserChanges};

pub const EMAIL_TAKEN: &str = "user profile with this email already exists.";

/// Persistence for users, feed items and auth tokens.
///
/// Lists come back ordered by id. Deleting a user removes its feed items and
/// tokens. Item-level updates and deletes report a missing id as
/// `DatabaseError::NotFound`.
#[async_trait]
pub trait Store: Send + Sync {
    fn backend(&self) -> StoreBackend;

    async fn health_check(&self) -> Result<(), DatabaseError>;

    async fn list_users(&self, search: &SearchFilter) -> Result<Vec<User>, DatabaseError>;
    async fn get_user(&self, id: i64) -> Result<Option<User>, DatabaseError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;
    async fn insert_user(&self, user: NewUser) -> Result<User, DatabaseError>;
    async fn update_user(&self, id: i64, changes: UserChanges) -> Result<User, DatabaseError>;
    async fn delete_user(&self, id: i64) -> Result<(), DatabaseError>;
    /// Enable or disable login and token use for a user
    async fn set_active(&self, id: i64, active: bool) -> Result<User, DatabaseError>;

    async fn list_feed_items(&self, search: &SearchFilter) -> Result<Vec<FeedItem>, DatabaseError>;
    async fn get_feed_item(&self, id: i64) -> Result<Option<FeedItem>, DatabaseError>;
    async fn insert_feed_item(&self, item: NewFeedItem) -> Result<FeedItem, DatabaseError>;
    async fn update_feed_item(&self, id: i64, status_text: String) -> Result<FeedItem, DatabaseError>;
    async fn delete_feed_item(&self, id: i64) -> Result<(), DatabaseError>;

    /// Remember a token digest for `user_id`
    async fn insert_token(&self, digest: &str, user_id: i64) -> Result<(), DatabaseError>;
    /// Resolve a token digest to its user
    async fn user_for_token(&self, digest: &str) -> Result<Option<User>, DatabaseError>;
}

pub(crate) fn email_taken() -> DatabaseError {
    DatabaseError::Conflict {
        field: "email",
        message: EMAIL_TAKEN.to_string(),
    }
}
