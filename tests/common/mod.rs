#![allow(dead_code)]

use axum::{
    body::{self, Body},
    http::{Method, Request, StatusCode},
    response::Response,
    Router,
};
use catalog_api::{app, connect, ensure_database_exists, AppConfig, AppState, Repositories};
use serde_json::{json, Value};
use std::sync::OnceLock;
use tokio::sync::Mutex;
use tower::ServiceExt;
use url::Url;
use uuid::Uuid;

pub const PASSWORD: &str = "Sturdy-Pass-42";

/// Server URL from `DATABASE_URL`; the database name in it is replaced per test.
pub fn postgres_server() -> Option<String> {
    std::env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty())
}

/// Create an empty `catalog_test_*` database on the server and return its URL.
pub async fn fresh_database_url(server: &str) -> String {
    static CREATE: OnceLock<Mutex<()>> = OnceLock::new();
    let mut url = Url::parse(server).expect("DATABASE_URL is not a url");
    url.set_path(&format!("/catalog_test_{}", Uuid::new_v4().simple()));
    let url = url.to_string();
    // CREATE DATABASE copies template1, which rejects concurrent copies
    let _guard = CREATE.get_or_init(|| Mutex::new(())).lock().await;
    ensure_database_exists(&url).await.expect("failed to create test database");
    url
}

/// Router over a fresh Postgres database when `DATABASE_URL` is set, otherwise over a fresh
/// in-memory store.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    pub async fn new() -> Self {
        let mut config = AppConfig::default();
        let repos = match postgres_server() {
            Some(server) => {
                config.database_url = Some(fresh_database_url(&server).await);
                config.database_max_connections = 2;
                connect(&config).await.expect("failed to open test database")
            }
            None => Repositories::in_memory(),
        };
        let state = AppState::new(config, repos);
        TestApp {
            router: app(state.clone()),
            state,
        }
    }

    /// Send a request with an optional JSON body and bearer token. Host is `testserver`.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>, token: Option<&str>) -> Response {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("host", "testserver");
        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
            }
            None => Body::empty(),
        };
        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.request(Method::GET, uri, None, None).await
    }

    /// Register `username` and log in; returns the access token.
    pub async fn user_token(&self, username: &str) -> String {
        let response = self
            .request(
                Method::POST,
                "/api/auth/register/",
                Some(json!({
                    "username": username,
                    "email": format!("{}@example.com", username),
                    "password": PASSWORD,
                    "password2": PASSWORD,
                })),
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let response = self
            .request(
                Method::POST,
                "/api/auth/login/",
                Some(json!({"username": username, "password": PASSWORD})),
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let tokens = response_json(response).await;
        tokens["access"].as_str().expect("access token").to_string()
    }

    pub async fn create_category(&self, token: &str, name: &str) -> Value {
        let response = self
            .request(
                Method::POST,
                "/api/categories/",
                Some(json!({"name": name, "description": format!("{} things", name)})),
                Some(token),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        response_json(response).await
    }

    pub async fn create_product(&self, token: &str, body: Value) -> Value {
        let response = self.request(Method::POST, "/api/products/", Some(body), Some(token)).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        response_json(response).await
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&bytes).expect("response body is not json")
}
