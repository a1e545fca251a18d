use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::auth;
use crate::database::models::User;
use crate::error::ApiError;
use crate::services::accounts;

/// Authenticated user context resolved from the request token
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub is_staff: bool,
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            is_staff: user.is_staff,
        }
    }
}

/// Identity of the caller for the current request; `None` when anonymous
#[derive(Clone, Debug, Default)]
pub struct Caller(pub Option<AuthUser>);

impl Caller {
    pub fn user(&self) -> Option<&AuthUser> {
        self.0.as_ref()
    }
}

/// Token authentication middleware.
///
/// Requests without token credentials continue anonymously; requests with a
/// bad token are rejected with 401 before reaching any handler.
pub async fn token_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = auth::parse_authorization(request.headers().get(header::AUTHORIZATION))?;

    let caller = match token {
        None => Caller(None),
        Some(token) => {
            let user = accounts::resolve_token(state.store.as_ref(), &token).await?;
            tracing::debug!(user_id = user.id, "Authenticated request");
            Caller(Some(AuthUser::from(user)))
        }
    };

    request.extensions_mut().insert(caller);
    Ok(next.run(request).await)
}
