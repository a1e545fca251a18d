pub mod auth;
pub mod response;

pub use auth::{token_auth_middleware, AuthUser, Caller};
pub use response::{ApiResponse, ApiResult};
