#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use serde_json::Value;
use sqlx::types::Json;
use tower::ServiceExt;
use uuid::Uuid;

use clipforge_api::auth::TokenCodec;
use clipforge_api::database::models::{NewUser, Pricing, Project, PromptMessage, Role, User};
use clipforge_api::database::{DatabaseError, Store};
use clipforge_api::services::{LlmClient, LlmError, MessageQueue, QueueError};
use clipforge_api::{AppState, ChatSettings};

pub const SECRET: &str = "test-secret";
pub const QUEUE_URL: &str = "https://sqs.us-east-1.amazonaws.com/123456789012/render-jobs";

/// In-memory store with switches for simulating outages
#[derive(Default)]
pub struct MemoryStore {
    pub users: Mutex<HashMap<Uuid, User>>,
    pub projects: Mutex<HashMap<Uuid, Project>>,
    pub pricing: Mutex<Vec<Pricing>>,
    pub fail_user_lookup: AtomicBool,
    pub fail_all: AtomicBool,
    pub fail_writes: AtomicBool,
    pub user_lookups: AtomicUsize,
}

impl MemoryStore {
    fn check(&self) -> Result<(), DatabaseError> {
        if self.fail_all.load(Ordering::SeqCst) {
            return Err(DatabaseError::Query("connection refused".into()));
        }
        Ok(())
    }

    fn check_write(&self) -> Result<(), DatabaseError> {
        self.check()?;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DatabaseError::Query("read-only transaction".into()));
        }
        Ok(())
    }

    pub fn insert_user(&self, role: Role) -> User {
        let user = User {
            id: Uuid::new_v4(),
            name: "Ada".into(),
            email: format!("{}@example.com", Uuid::new_v4().simple()),
            external_token: "google-token".into(),
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.users.lock().unwrap().insert(user.id, user.clone());
        user
    }

    pub fn project(&self, id: Uuid) -> Option<Project> {
        self.projects.lock().unwrap().get(&id).cloned()
    }

    pub fn project_count(&self) -> usize {
        self.projects.lock().unwrap().len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        self.check()?;
        let users = self.users.lock().unwrap();
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        self.check()?;
        let created = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            external_token: user.external_token,
            role: Role::User,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.users
            .lock()
            .unwrap()
            .insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        self.user_lookups.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        if self.fail_user_lookup.load(Ordering::SeqCst) {
            return Err(DatabaseError::Query("timeout".into()));
        }
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn create_project(
        &self,
        prompts: &[PromptMessage],
        user_id: Uuid,
    ) -> Result<Project, DatabaseError> {
        self.check_write()?;
        let project = Project {
            id: Uuid::new_v4(),
            prompts: Json(prompts.to_vec()),
            code: None,
            user_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.projects
            .lock()
            .unwrap()
            .insert(project.id, project.clone());
        Ok(project)
    }

    async fn update_project_code(&self, id: Uuid, code: &str) -> Result<Project, DatabaseError> {
        self.check_write()?;
        let mut projects = self.projects.lock().unwrap();
        let project = projects
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::NotFound(format!("project {}", id)))?;
        project.code = Some(code.to_string());
        project.updated_at = Utc::now();
        Ok(project.clone())
    }

    async fn list_pricing(&self) -> Result<Vec<Pricing>, DatabaseError> {
        self.check()?;
        Ok(self.pricing.lock().unwrap().clone())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        self.check()
    }
}

/// Model stand-in: replies with fixed text, or fails like an overloaded API
pub struct StubLlm {
    pub reply: Option<String>,
    pub calls: AtomicUsize,
}

impl StubLlm {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Some(text.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl LlmClient for StubLlm {
    async fn generate(
        &self,
        _messages: &[PromptMessage],
        _system_prompt: &str,
        _max_tokens: u32,
    ) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Some(text) => Ok(text.clone()),
            None => Err(LlmError::Api {
                status: 529,
                body: "overloaded".into(),
            }),
        }
    }
}

#[derive(Default)]
pub struct RecordingQueue {
    pub published: Mutex<Vec<(String, String)>>,
    pub fail: AtomicBool,
}

#[async_trait]
impl MessageQueue for RecordingQueue {
    async fn publish(&self, queue_url: &str, body: String) -> Result<(), QueueError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(QueueError::Publish("AccessDenied".into()));
        }
        self.published
            .lock()
            .unwrap()
            .push((queue_url.to_string(), body));
        Ok(())
    }
}

pub struct TestApp {
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub llm: Arc<StubLlm>,
    pub queue: Arc<RecordingQueue>,
    pub codec: TokenCodec,
}

impl TestApp {
    pub fn new(llm: StubLlm) -> Self {
        let store = Arc::new(MemoryStore::default());
        let llm = Arc::new(llm);
        let queue = Arc::new(RecordingQueue::default());
        let codec = TokenCodec::new(SECRET, 168).unwrap();

        let state = AppState::new(
            store.clone(),
            llm.clone(),
            queue.clone(),
            codec.clone(),
            ChatSettings {
                system_prompt: "Write Manim code.".into(),
                max_tokens: 300,
                queue_url: QUEUE_URL.into(),
            },
        );

        Self {
            state,
            store,
            llm,
            queue,
            codec,
        }
    }

    pub fn router(&self) -> Router {
        clipforge_api::router(self.state.clone())
    }

    /// Store a user with the given role and sign a token for them
    pub fn login_as(&self, role: Role) -> (User, String) {
        let user = self.store.insert_user(role);
        let token = self.codec.issue(&user).unwrap();
        (user, token)
    }

    pub fn lookups(&self) -> usize {
        self.store.user_lookups.load(Ordering::SeqCst)
    }
}

pub async fn send(
    router: Router,
    method: Method,
    uri: &str,
    auth: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
