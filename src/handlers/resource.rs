//! Generic records interface.
//!
//! Each persisted entity implements [`Resource`]; one dispatcher maps the
//! HTTP verb and path shape onto a named operation and runs the resource's
//! permission chain before any write.

use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::Method,
    response::{IntoResponse, Response},
    Extension,
};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::info;

use crate::app::AppState;
use crate::database::Store;
use crate::error::ApiError;
use crate::filter::{SearchFilter, SearchParams};
use crate::middleware::{ApiResponse, AuthUser, Caller};
use crate::policy::{check_object_permissions, check_permissions, Denial, Draft, Owned, Permission};
use crate::types::{Operation, PathShape};
use crate::validation::parse_object;

#[async_trait]
pub trait Resource: Send + Sync + 'static {
    type Record: Owned + Clone + Send + Sync;
    type View: Serialize + Send;

    /// Name used in logs
    const NAME: &'static str;

    /// Checks run in order before the operation body
    const PERMISSIONS: &'static [&'static dyn Permission];

    fn view(record: &Self::Record) -> Self::View;

    async fn list(store: &dyn Store, search: &SearchFilter) -> Result<Vec<Self::Record>, ApiError>;

    async fn retrieve(store: &dyn Store, id: i64) -> Result<Option<Self::Record>, ApiError>;

    /// Validate `data` and persist a new record owned by `caller`
    async fn create(store: &dyn Store, caller: &AuthUser, data: &Map<String, Value>) -> Result<Self::Record, ApiError>;

    /// Validate `data` and apply it. `partial` relaxes required fields.
    async fn update(
        store: &dyn Store,
        record: &Self::Record,
        data: &Map<String, Value>,
        partial: bool,
    ) -> Result<Self::Record, ApiError>;

    async fn destroy(store: &dyn Store, record: &Self::Record) -> Result<(), ApiError>;
}

/// `GET` / `POST` on the collection path
pub async fn collection<R: Resource>(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    method: Method,
    Query(params): Query<SearchParams>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let operation = Operation::resolve(&method, PathShape::Collection)
        .ok_or_else(|| ApiError::method_not_allowed(&method))?;
    dispatch::<R>(&state, &caller, operation, None, &params, &body).await
}

/// `GET` / `PUT` / `PATCH` / `DELETE` on the item path
pub async fn item<R: Resource>(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    method: Method,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let operation = Operation::resolve(&method, PathShape::Item)
        .ok_or_else(|| ApiError::method_not_allowed(&method))?;
    dispatch::<R>(&state, &caller, operation, Some(&id), &SearchParams::default(), &body).await
}

async fn dispatch<R: Resource>(
    state: &AppState,
    caller: &Caller,
    operation: Operation,
    id: Option<&str>,
    params: &SearchParams,
    body: &[u8],
) -> Result<Response, ApiError> {
    let store = state.store.as_ref();
    let action = operation.action();

    // Collection-level checks come first so anonymous callers learn nothing
    // about which records exist.
    check_permissions(R::PERMISSIONS, caller.user(), action)?;

    match operation {
        Operation::List => {
            let search = SearchFilter::parse(params.search.as_deref());
            let records = R::list(store, &search).await?;
            let views: Vec<R::View> = records.iter().map(R::view).collect();
            Ok(ApiResponse::success(views).into_response())
        }
        Operation::Create => {
            let draft = Draft::for_caller(caller.user());
            check_object_permissions(R::PERMISSIONS, caller.user(), action, &draft)?;
            let user = caller.user().ok_or(Denial::NotAuthenticated)?;

            let data = parse_object(body)?;
            let record = R::create(store, user, &data).await?;
            info!(resource = R::NAME, caller = user.id, "Created record");
            Ok(ApiResponse::created(R::view(&record)).into_response())
        }
        Operation::Retrieve | Operation::Update | Operation::PartialUpdate | Operation::Destroy => {
            let record = load::<R>(store, id).await?;
            check_object_permissions(R::PERMISSIONS, caller.user(), action, &record)?;

            match operation {
                Operation::Retrieve => Ok(ApiResponse::success(R::view(&record)).into_response()),
                Operation::Destroy => {
                    R::destroy(store, &record).await?;
                    info!(resource = R::NAME, owner = ?record.owner_id(), "Deleted record");
                    Ok(ApiResponse::no_content().into_response())
                }
                _ => {
                    let partial = operation == Operation::PartialUpdate;
                    let data = parse_object(body)?;
                    let updated = R::update(store, &record, &data, partial).await?;
                    info!(resource = R::NAME, owner = ?record.owner_id(), partial, "Updated record");
                    Ok(ApiResponse::success(R::view(&updated)).into_response())
                }
            }
        }
    }
}

/// Fetch the addressed record. A malformed id is simply not found.
async fn load<R: Resource>(store: &dyn Store, id: Option<&str>) -> Result<R::Record, ApiError> {
    let id = id
        .and_then(|raw| raw.parse::<i64>().ok())
        .ok_or_else(ApiError::not_found)?;
    R::retrieve(store, id).await?.ok_or_else(ApiError::not_found)
}
