#![allow(dead_code)]

use std::{
    net::TcpListener,
    sync::{atomic::{AtomicBool, Ordering}, Arc, Mutex},
    time::Duration,
};

use actix_web::{web, App, HttpServer};
use async_trait::async_trait;
use chrono::Utc;
use portfolio_contact::{
    entities::contact_message::{ContactMessageInsert, StoredContactMessage},
    errors::AppError,
    limiter::rate_limiter::InMemoryRateLimitStore,
    repositories::contact_message::ContactMessageRepository,
    routes::configure_routes,
    settings::{AppConfig, AppEnvironment},
    AppState,
};
use reqwest::Client;
use serde_json::{json, Value};
use uuid::Uuid;

/// Repository double that keeps inserts in memory and can be told to fail.
#[derive(Default)]
pub struct RecordingContactRepo {
    stored: Mutex<Vec<StoredContactMessage>>,
    fail: AtomicBool,
}

impl RecordingContactRepo {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        let repo = Self::default();
        repo.fail.store(true, Ordering::SeqCst);
        Arc::new(repo)
    }

    pub fn stored(&self) -> Vec<StoredContactMessage> {
        self.stored.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContactMessageRepository for RecordingContactRepo {
    async fn check_connection(&self) -> Result<(), AppError> {
        if self.fail.load(Ordering::SeqCst) {
            Err(AppError::InternalError("connection refused".into()))
        } else {
            Ok(())
        }
    }

    async fn create_contact_message(&self, msg: &ContactMessageInsert) -> Result<StoredContactMessage, AppError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::InternalError("relation \"contact_messages\" does not exist".into()));
        }

        let stored = StoredContactMessage {
            id: Uuid::new_v4(),
            name: msg.name.clone(),
            email: msg.email.clone(),
            message: msg.message.clone(),
            created_at: Utc::now(),
        };
        self.stored.lock().unwrap().push(stored.clone());
        Ok(stored)
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        env: AppEnvironment::Testing,
        name: "Portfolio Contact Test".to_string(),
        database_url: "postgres://unused@127.0.0.1/test_db".into(),
        port: 0,
        worker_count: 1,
        ..AppConfig::default()
    }
}

pub fn test_state(repo: Arc<RecordingContactRepo>) -> AppState {
    AppState::new(&test_config(), repo, Arc::new(InMemoryRateLimitStore::new()))
}

pub fn valid_payload() -> Value {
    json!({
        "name": "Ada Lovelace",
        "email": "ada@example.com",
        "message": "I would love to chat about your projects."
    })
}

pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub repo: Arc<RecordingContactRepo>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(RecordingContactRepo::new()).await
    }

    pub async fn spawn_with(repo: Arc<RecordingContactRepo>) -> Self {
        let state = web::Data::new(test_state(repo.clone()));

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let server = HttpServer::new(move || {
            App::new()
                .app_data(state.clone())
                .configure(configure_routes)
        })
        .listen(listener)
        .expect("Failed to bind server")
        .workers(1)
        .run();

        tokio::spawn(server);

        let client = Client::new();
        while client.get(format!("{}/health", address)).send().await.is_err() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        Self { address, client, repo }
    }

    pub fn contact_url(&self) -> String {
        format!("{}/submit-contact", self.address)
    }
}
