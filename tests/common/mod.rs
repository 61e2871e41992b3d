#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use cashtrackr_api::emails::RecordingMailer;
use cashtrackr_api::store::MemoryStore;
use cashtrackr_api::{app, AppState};

pub const PASSWORD: &str = "password123";

/// Full application wired to the in-memory store and a capturing mailer.
/// Requests are driven through the router directly with `oneshot`.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub mailer: Arc<RecordingMailer>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let mailer = Arc::new(RecordingMailer::new());
        let state = AppState::with_store(store.clone(), mailer.clone());

        Self {
            router: app(state),
            store,
            mailer,
        }
    }

    pub async fn request(
        &self,
        method: &str,
        path: &str,
        bearer: Option<&str>,
        body: Option<Value>,
    ) -> Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };

        Ok(TestResponse { status, body })
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<TestResponse> {
        self.request("POST", path, None, Some(body)).await
    }

    pub async fn post_auth(&self, path: &str, token: &str, body: Value) -> Result<TestResponse> {
        self.request("POST", path, Some(token), Some(body)).await
    }

    pub async fn get_auth(&self, path: &str, token: &str) -> Result<TestResponse> {
        self.request("GET", path, Some(token), None).await
    }

    pub async fn put_auth(&self, path: &str, token: &str, body: Value) -> Result<TestResponse> {
        self.request("PUT", path, Some(token), Some(body)).await
    }

    pub async fn delete_auth(&self, path: &str, token: &str) -> Result<TestResponse> {
        self.request("DELETE", path, Some(token), None).await
    }

    /// Runs the full signup flow: create account, confirm it with the token
    /// captured by the mailer, log in and return the session credential.
    pub async fn register_confirmed(&self, name: &str, email: &str) -> Result<String> {
        let res = self
            .post(
                "/api/auth/create-account",
                json!({ "name": name, "email": email, "password": PASSWORD }),
            )
            .await?;
        anyhow::ensure!(res.status == StatusCode::CREATED, "signup failed: {:?}", res.body);

        let token = self
            .mailer
            .last_token()
            .ok_or_else(|| anyhow::anyhow!("no confirmation email captured"))?;

        let res = self
            .post("/api/auth/confirm-account", json!({ "token": token }))
            .await?;
        anyhow::ensure!(res.status == StatusCode::OK, "confirm failed: {:?}", res.body);

        let res = self
            .post(
                "/api/auth/login",
                json!({ "email": email, "password": PASSWORD }),
            )
            .await?;
        anyhow::ensure!(res.status == StatusCode::OK, "login failed: {:?}", res.body);

        res.body
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("login body is not a token string"))
    }

    /// Creates a confirmed user with a budget, returning (jwt, budget_id).
    pub async fn register_with_budget(
        &self,
        name: &str,
        email: &str,
        budget_name: &str,
        amount: i64,
    ) -> Result<(String, i64)> {
        let token = self.register_confirmed(name, email).await?;

        let res = self
            .post_auth(
                "/api/budgets",
                &token,
                json!({ "name": budget_name, "amount": amount }),
            )
            .await?;
        anyhow::ensure!(
            res.status == StatusCode::CREATED,
            "budget creation failed: {:?}",
            res.body
        );

        let res = self.get_auth("/api/budgets", &token).await?;
        let budget_id = res.body[0]["id"]
            .as_i64()
            .ok_or_else(|| anyhow::anyhow!("budget listing has no id"))?;

        Ok((token, budget_id))
    }
}
