// handlers/hello.rs - /hello/ and /hello-viewset/ demo endpoints
//
// Stateless; no authentication and nothing persisted.

use axum::{body::Bytes, extract::Path, http::Method};
use serde_json::{json, Value};

use crate::api::serializers::HelloInput;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::types::{Operation, PathShape};
use crate::validation::parse_object;

const AN_APIVIEW: [&str; 4] = [
    "Uses HTTP methods as functions (get, post, patch, put, delete)",
    "Is similar to a traditional Django View",
    "Gives you the most control over your application logic",
    "Is mapped manually to URLs",
];

const A_VIEWSET: [&str; 3] = [
    "Uses actions (list, create, retrieve, update, partial_update)",
    "Automatically maps to URLs using Routers",
    "Provides more functionality with less code",
];

fn greet(body: &[u8]) -> ApiResult<Value> {
    let data = parse_object(body)?;
    let input = HelloInput::validate(&data)?;
    Ok(ApiResponse::success(json!({ "message": format!("Hello {}", input.name) })))
}

/// GET /hello/
pub async fn hello_get() -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({ "message": "Hello", "an_apiview": AN_APIVIEW })))
}

/// POST /hello/
pub async fn hello_post(body: Bytes) -> ApiResult<Value> {
    greet(&body)
}

/// PUT, PATCH, DELETE /hello/:id/ echo the verb
pub async fn hello_item(method: Method, Path(_id): Path<String>) -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({ "method": method.as_str() })))
}

/// GET, POST /hello-viewset/
pub async fn viewset_collection(method: Method, body: Bytes) -> ApiResult<Value> {
    match Operation::resolve(&method, PathShape::Collection) {
        Some(Operation::List) => Ok(ApiResponse::success(json!({
            "message": "Hello!",
            "a_viewset": A_VIEWSET,
        }))),
        Some(Operation::Create) => greet(&body),
        _ => Err(ApiError::method_not_allowed(&method)),
    }
}

/// GET, PUT, PATCH, DELETE /hello-viewset/:id/ echo the verb
pub async fn viewset_item(method: Method, Path(_id): Path<String>) -> ApiResult<Value> {
    match Operation::resolve(&method, PathShape::Item) {
        Some(_) => Ok(ApiResponse::success(json!({ "http_method": method.as_str() }))),
        None => Err(ApiError::method_not_allowed(&method)),
    }
}
