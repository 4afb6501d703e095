// Shared fixtures for the service tests: in-memory SQLite + a recording mailer
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use super::email_service::{EmailError, EmailSender, EmailService, OutgoingEmail};
use super::AuthService;
use crate::config::{AppConfig, AuthConfig, Config, DatabaseConfig, EmailConfig, RateLimitConfig};
use crate::db;
use crate::models::admin;
use crate::models::dto::NewAdminRequest;

pub const TEST_PASSWORD: &str = "password123";

pub async fn test_db() -> DatabaseConnection {
    // A single long-lived connection keeps the in-memory database alive
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(options).await.unwrap();
    db::run_migrations(&db).await.unwrap();
    db
}

pub fn test_config() -> Config {
    Config {
        app: AppConfig {
            env: "test".to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
            frontend_url: "http://localhost:3000".to_string(),
            allowed_origins: vec!["http://localhost:3000".to_string()],
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
        },
        auth: AuthConfig {
            jwt_secret: "test-secret".to_string(),
            jwt_expiry_hours: 1,
            reset_token_ttl_minutes: 60,
            password_hash_iterations: 1_000,
        },
        email: EmailConfig {
            sendgrid_api_key: None,
            from_email: "no-reply@example.org".to_string(),
            from_name: "Test".to_string(),
            admin_email: Some("admin@example.org".to_string()),
        },
        rate_limit: RateLimitConfig::default(),
    }
}

#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<OutgoingEmail>>,
    pub fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        RecordingMailer {
            fail: true,
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailSender for RecordingMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), EmailError> {
        self.sent.lock().unwrap().push(email);
        if self.fail {
            return Err(EmailError::Rejected {
                status: 500,
                body: "simulated failure".to_string(),
            });
        }
        Ok(())
    }
}

pub fn email_service(config: &Config, mailer: Arc<RecordingMailer>) -> EmailService {
    EmailService::new(mailer, &config.app, &config.email, config.auth.reset_token_ttl_minutes)
}

/// Inserts an admin row directly, for tests that only need a valid foreign key
pub async fn insert_admin(db: &DatabaseConnection, email: &str) -> admin::Model {
    let now = Utc::now();
    admin::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        password: Set("pbkdf2:sha256:1$c2FsdA$aGFzaA".to_string()),
        first_name: Set("Grace".to_string()),
        last_name: Set("Hopper".to_string()),
        is_active: Set(true),
        last_login: Set(None),
        reset_password_token: Set(None),
        reset_password_expires: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn seed_admin(auth: &AuthService, email: &str) -> admin::Model {
    auth.provision_admin(NewAdminRequest {
        email: email.to_string(),
        password: TEST_PASSWORD.to_string(),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
    })
    .await
    .unwrap()
}
