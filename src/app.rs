use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{any, get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{AppConfig, Environment};
use crate::database::Store;
use crate::handlers::{hello, login, resource, system, Feed, Profiles, Resource};
use crate::middleware::token_auth_middleware;

/// Shared per-process state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: AppConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}

pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    let router = Router::new()
        // Public
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .merge(hello_routes())
        .merge(slashed("/login", post(login::login)))
        .merge(record_routes(&state))
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(cors_layer(&config))
        .with_state(state);

    if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Owned records. Only these routes read the caller's token; login and the
/// public endpoints ignore any `Authorization` header.
fn record_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(resource_routes::<Profiles>("/profiles"))
        .merge(resource_routes::<Feed>("/feed"))
        .route_layer(middleware::from_fn_with_state(state.clone(), token_auth_middleware))
}

/// Register `path/` and `path` for the same handler
fn slashed(path: &str, handler: axum::routing::MethodRouter<AppState>) -> Router<AppState> {
    Router::new()
        .route(&format!("{}/", path), handler.clone())
        .route(path, handler)
}

fn resource_routes<R: Resource>(prefix: &str) -> Router<AppState> {
    Router::new()
        .merge(slashed(prefix, any(resource::collection::<R>)))
        .merge(slashed(&format!("{}/:id", prefix), any(resource::item::<R>)))
}

fn hello_routes() -> Router<AppState> {
    use axum::routing::put;

    Router::new()
        .merge(slashed("/hello", get(hello::hello_get).post(hello::hello_post)))
        .merge(slashed(
            "/hello/:id",
            put(hello::hello_item)
                .patch(hello::hello_item)
                .delete(hello::hello_item),
        ))
        .merge(slashed("/hello-viewset", any(hello::viewset_collection)))
        .merge(slashed("/hello-viewset/:id", any(hello::viewset_item)))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if !config.security.enable_cors {
        return CorsLayer::new();
    }
    if config.environment == Environment::Development {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::ACCEPT, header::CONTENT_TYPE])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn test_app(config: AppConfig) -> Router {
        app(AppState::new(Arc::new(MemoryStore::new()), config))
    }

    #[tokio::test]
    async fn routes_answer_with_and_without_trailing_slash() {
        for uri in ["/profiles/", "/profiles", "/feed/", "/feed", "/hello/", "/hello"] {
            let response = test_app(AppConfig::development())
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{}", uri);
        }
    }

    #[tokio::test]
    async fn oversized_bodies_are_rejected() {
        let mut config = AppConfig::development();
        config.api.max_request_size_bytes = 16;

        let response = test_app(config)
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/hello/")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(format!("{{\"name\": \"{}\"}}", "x".repeat(64))))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn cors_origins_are_parsed_outside_development() {
        let mut config = AppConfig::production();
        config.security.cors_origins.push("not a header\n".to_string());
        // Invalid entries are skipped rather than failing startup
        let _ = cors_layer(&config);
    }
}
