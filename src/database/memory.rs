use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use crate::config::StoreBackend;
use crate::filter::SearchFilter;

use super::manager::DatabaseError;
use super::models::{FeedItem, NewFeedItem, NewUser, User, UserChanges};
use super::store::{email_taken, Store};

#[derive(Debug, Default)]
struct MemoryState {
    users: BTreeMap<i64, User>,
    feed_items: BTreeMap<i64, FeedItem>,
    /// token digest -> user id
    tokens: HashMap<String, i64>,
    last_user_id: i64,
    last_feed_item_id: i64,
}

impl MemoryState {
    fn email_in_use(&self, email: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|user| user.email == email && Some(user.id) != except)
    }
}

/// Process-local store used for development runs and tests.
/// Ids are assigned sequentially from 1 and never reused.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> StoreBackend {
        StoreBackend::Memory
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn list_users(&self, search: &SearchFilter) -> Result<Vec<User>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .filter(|user| search.matches(&[&user.name, &user.email]))
            .cloned()
            .collect())
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|user| user.email == email).cloned())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let mut state = self.state.write().await;
        if state.email_in_use(&user.email, None) {
            return Err(email_taken());
        }

        state.last_user_id += 1;
        let record = User {
            id: state.last_user_id,
            email: user.email,
            name: user.name,
            password: user.password,
            is_active: true,
            is_staff: user.is_staff,
            created_at: Utc::now(),
        };
        state.users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_user(&self, id: i64, changes: UserChanges) -> Result<User, DatabaseError> {
        let mut state = self.state.write().await;
        if let Some(email) = changes.email.as_deref() {
            if state.email_in_use(email, Some(id)) {
                return Err(email_taken());
            }
        }

        let user = state
            .users
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::NotFound(format!("user {}", id)))?;
        changes.apply(user);
        Ok(user.clone())
    }

    async fn delete_user(&self, id: i64) -> Result<(), DatabaseError> {
        let mut state = self.state.write().await;
        if state.users.remove(&id).is_none() {
            return Err(DatabaseError::NotFound(format!("user {}", id)));
        }
        state.feed_items.retain(|_, item| item.owner_id != id);
        state.tokens.retain(|_, user_id| *user_id != id);
        Ok(())
    }

    async fn set_active(&self, id: i64, active: bool) -> Result<User, DatabaseError> {
        let mut state = self.state.write().await;
        let user = state
            .users
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::NotFound(format!("user {}", id)))?;
        user.is_active = active;
        Ok(user.clone())
    }

    async fn list_feed_items(&self, search: &SearchFilter) -> Result<Vec<FeedItem>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state
            .feed_items
            .values()
            .filter(|item| match state.users.get(&item.owner_id) {
                Some(owner) => search.matches(&[&owner.name, &owner.email, &item.status_text]),
                None => false,
            })
            .cloned()
            .collect())
    }

    async fn get_feed_item(&self, id: i64) -> Result<Option<FeedItem>, DatabaseError> {
        Ok(self.state.read().await.feed_items.get(&id).cloned())
    }

    async fn insert_feed_item(&self, item: NewFeedItem) -> Result<FeedItem, DatabaseError> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&item.owner_id) {
            return Err(DatabaseError::NotFound(format!("user {}", item.owner_id)));
        }

        state.last_feed_item_id += 1;
        let record = FeedItem {
            id: state.last_feed_item_id,
            owner_id: item.owner_id,
            status_text: item.status_text,
            created_at: Utc::now(),
        };
        state.feed_items.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_feed_item(&self, id: i64, status_text: String) -> Result<FeedItem, DatabaseError> {
        let mut state = self.state.write().await;
        let item = state
            .feed_items
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::NotFound(format!("feed item {}", id)))?;
        item.status_text = status_text;
        Ok(item.clone())
    }

    async fn delete_feed_item(&self, id: i64) -> Result<(), DatabaseError> {
        let mut state = self.state.write().await;
        state
            .feed_items
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DatabaseError::NotFound(format!("feed item {}", id)))
    }

    async fn insert_token(&self, digest: &str, user_id: i64) -> Result<(), DatabaseError> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&user_id) {
            return Err(DatabaseError::NotFound(format!("user {}", user_id)));
        }
        state.tokens.insert(digest.to_string(), user_id);
        Ok(())
    }

    async fn user_for_token(&self, digest: &str) -> Result<Option<User>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state
            .tokens
            .get(digest)
            .and_then(|user_id| state.users.get(user_id))
            .cloned())
    }
}
