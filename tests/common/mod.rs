//! Shared helpers: an app over in-memory repositories and a JSON request helper.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use stockroom::{build_app, AppState};
use tower::ServiceExt;

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        let state = AppState::fake();
        Self {
            app: build_app(state.clone()),
            state,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        bearer: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body), None).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(body), None).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, None, None).await
    }

    /// Registers Ana and returns her id.
    pub async fn create_ana(&self) -> i64 {
        let (status, body) = self
            .post(
                "/users",
                serde_json::json!({ "name": "Ana", "email": "a@x.com", "password": "secret" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["id"].as_i64().unwrap()
    }

    pub async fn login_ana(&self) -> String {
        let (status, body) = self
            .post(
                "/users/login",
                serde_json::json!({ "email": "a@x.com", "password": "secret" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        body["token"].as_str().unwrap().to_string()
    }
}
