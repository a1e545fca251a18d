use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::api::serializers::ProfileInput;
use crate::api::ProfileView;
use crate::database::models::User;
use crate::database::Store;
use crate::error::ApiError;
use crate::filter::SearchFilter;
use crate::middleware::AuthUser;
use crate::policy::{Permission, OWNER_WRITES};
use crate::services::accounts;

use super::resource::Resource;

/// User profiles. A profile is owned by the user it describes.
pub struct Profiles;

#[async_trait]
impl Resource for Profiles {
    type Record = User;
    type View = ProfileView;

    const NAME: &'static str = "profile";
    const PERMISSIONS: &'static [&'static dyn Permission] = OWNER_WRITES;

    fn view(record: &User) -> ProfileView {
        ProfileView::from(record)
    }

    async fn list(store: &dyn Store, search: &SearchFilter) -> Result<Vec<User>, ApiError> {
        Ok(store.list_users(search).await?)
    }

    async fn retrieve(store: &dyn Store, id: i64) -> Result<Option<User>, ApiError> {
        Ok(store.get_user(id).await?)
    }

    async fn create(store: &dyn Store, _caller: &AuthUser, data: &Map<String, Value>) -> Result<User, ApiError> {
        let input = ProfileInput::validate(data, false)?;
        Ok(accounts::register(store, input, false).await?)
    }

    async fn update(
        store: &dyn Store,
        record: &User,
        data: &Map<String, Value>,
        partial: bool,
    ) -> Result<User, ApiError> {
        let input = ProfileInput::validate(data, partial)?;
        Ok(accounts::update_profile(store, record.id, input).await?)
    }

    async fn destroy(store: &dyn Store, record: &User) -> Result<(), ApiError> {
        Ok(store.delete_user(record.id).await?)
    }
}
