use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::api::serializers::FeedItemInput;
use crate::api::FeedItemView;
use crate::database::models::{FeedItem, NewFeedItem};
use crate::database::Store;
use crate::error::ApiError;
use crate::filter::SearchFilter;
use crate::middleware::AuthUser;
use crate::policy::{Permission, OWNER_WRITES};
use crate::validation::REQUIRED;

use super::resource::Resource;

/// Status updates. The author is always the authenticated caller.
pub struct Feed;

#[async_trait]
impl Resource for Feed {
    type Record = FeedItem;
    type View = FeedItemView;

    const NAME: &'static str = "feed_item";
    const PERMISSIONS: &'static [&'static dyn Permission] = OWNER_WRITES;

    fn view(record: &FeedItem) -> FeedItemView {
        FeedItemView::from(record)
    }

    async fn list(store: &dyn Store, search: &SearchFilter) -> Result<Vec<FeedItem>, ApiError> {
        Ok(store.list_feed_items(search).await?)
    }

    async fn retrieve(store: &dyn Store, id: i64) -> Result<Option<FeedItem>, ApiError> {
        Ok(store.get_feed_item(id).await?)
    }

    async fn create(store: &dyn Store, caller: &AuthUser, data: &Map<String, Value>) -> Result<FeedItem, ApiError> {
        let input = FeedItemInput::validate(data, false)?;
        let status_text = input.status_text.ok_or_else(missing_status_text)?;

        // Any owner in the body is ignored
        let item = NewFeedItem {
            owner_id: caller.id,
            status_text,
        };
        Ok(store.insert_feed_item(item).await?)
    }

    async fn update(
        store: &dyn Store,
        record: &FeedItem,
        data: &Map<String, Value>,
        partial: bool,
    ) -> Result<FeedItem, ApiError> {
        let input = FeedItemInput::validate(data, partial)?;
        match input.status_text {
            Some(status_text) => Ok(store.update_feed_item(record.id, status_text).await?),
            None if partial => Ok(record.clone()),
            None => Err(missing_status_text()),
        }
    }

    async fn destroy(store: &dyn Store, record: &FeedItem) -> Result<(), ApiError> {
        Ok(store.delete_feed_item(record.id).await?)
    }
}

fn missing_status_text() -> ApiError {
    ApiError::field("status_text", REQUIRED)
}
