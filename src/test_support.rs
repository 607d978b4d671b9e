//! Router-level test harness: in-memory store, recording mailer, real routes.

use std::sync::{Arc, OnceLock};

use axum::{
    body::Body,
    extract::FromRef,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use crate::{
    app::build_app,
    auth::{jwt::JwtKeys, password::hash_password},
    mailer::fake::RecordingMailer,
    state::AppState,
    store::{memory::MemoryStore, Store},
    users::repo_types::{NewUser, Role, User},
};

pub const PASSWORD: &str = "pass";

// Argon2 is slow in debug builds; hash the shared fixture password once.
fn fixture_hash() -> String {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| hash_password(PASSWORD).expect("hash fixture password"))
        .clone()
}

pub struct TestApp {
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub mailer: Arc<RecordingMailer>,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let mailer = Arc::new(RecordingMailer::default());
        let state = AppState::fake(store.clone(), mailer.clone());
        let router = build_app(state.clone());
        Self {
            state,
            store,
            mailer,
            router,
        }
    }

    pub async fn user_with_role(&self, email: &str, role: Role) -> User {
        self.store
            .create_user(NewUser {
                email: email.into(),
                password_hash: fixture_hash(),
                first_name: String::new(),
                last_name: String::new(),
                role,
            })
            .await
            .expect("create fixture user")
    }

    pub async fn user(&self, email: &str) -> User {
        self.user_with_role(email, Role::User).await
    }

    pub async fn admin(&self) -> User {
        self.user_with_role("admin@admin.com", Role::Admin).await
    }

    pub fn token(&self, user: &User) -> String {
        JwtKeys::from_ref(&self.state)
            .sign_access(user.id)
            .expect("sign access token")
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(serde_json::to_vec(&json).expect("encode body"))
            }
            None => Body::empty(),
        };
        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).expect("build request"))
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }
}
