#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::{RequestBuilder, StatusCode};
use serde_json::{json, Value};

use profiles_api::api::serializers::ProfileInput;
use profiles_api::app::{app, AppState};
use profiles_api::config::AppConfig;
use profiles_api::database::models::User;
use profiles_api::database::{MemoryStore, Store};
use profiles_api::services::accounts;

pub const PASSWORD: &str = "correct horse battery";

/// An in-process server on an ephemeral port with its own empty store
pub struct TestServer {
    pub base_url: String,
    pub store: Arc<dyn Store>,
    pub client: reqwest::Client,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), AppConfig::development());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("failed to bind test listener")?;
        let addr = listener.local_addr()?;

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app(state)).await {
                eprintln!("test server stopped: {}", e);
            }
        });

        Ok(Self {
            base_url: format!("http://{}", addr),
            store,
            client: reqwest::Client::new(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path))
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path))
    }

    pub fn put(&self, path: &str) -> RequestBuilder {
        self.client.put(self.url(path))
    }

    pub fn patch(&self, path: &str) -> RequestBuilder {
        self.client.patch(self.url(path))
    }

    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.client.delete(self.url(path))
    }

    /// Register a user directly in the store
    pub async fn create_user(&self, email: &str, name: &str) -> Result<User> {
        let input = ProfileInput {
            email: Some(email.to_string()),
            name: Some(name.to_string()),
            password: Some(PASSWORD.to_string()),
        };
        Ok(accounts::register(self.store.as_ref(), input, false).await?)
    }

    /// Obtain a token through `POST /login/`
    pub async fn login(&self, email: &str) -> Result<String> {
        let res = self
            .post("/login/")
            .json(&json!({ "username": email, "password": PASSWORD }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());

        let body = res.json::<Value>().await?;
        body.get("token")
            .and_then(Value::as_str)
            .map(str::to_string)
            .context("login response has no token")
    }

    /// Create a user and log in as them
    pub async fn user_with_token(&self, email: &str, name: &str) -> Result<(User, String)> {
        let user = self.create_user(email, name).await?;
        let token = self.login(email).await?;
        Ok((user, token))
    }
}

pub fn auth(token: &str) -> String {
    format!("Token {}", token)
}
