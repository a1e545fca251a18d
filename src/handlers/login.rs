// handlers/login.rs - POST /login/ handler

use axum::{body::Bytes, extract::State};
use serde::Serialize;

use crate::api::serializers::LoginInput;
use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::accounts;
use crate::validation::{parse_object, NON_FIELD_ERRORS};

const BAD_CREDENTIALS: &str = "Unable to log in with provided credentials.";

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/**
 * POST /login/ - Exchange credentials for an auth token
 *
 * Body: `{"username": "<email>", "password": "..."}`
 * Output: `{"token": "<64 hex chars>"}`, sent afterwards as
 * `Authorization: Token <token>`.
 */
pub async fn login(State(state): State<AppState>, body: Bytes) -> ApiResult<TokenResponse> {
    let data = parse_object(&body)?;
    let input = LoginInput::validate(&data)?;

    let store = state.store.as_ref();
    let user = accounts::authenticate(store, &input.username, &input.password)
        .await?
        .ok_or_else(|| ApiError::field(NON_FIELD_ERRORS, BAD_CREDENTIALS))?;

    let token = accounts::issue_token(store, &user).await?;
    Ok(ApiResponse::success(TokenResponse { token }))
}
