// Shared setup for the HTTP tests: in-memory SQLite behind the real route table
#![allow(dead_code)]

use actix_web::web;
use sea_orm::{ConnectOptions, Database};

use rac_backend::config::{AppConfig, AuthConfig, Config, DatabaseConfig, EmailConfig, RateLimitConfig};
use rac_backend::models::dto::NewAdminRequest;
use rac_backend::services::EmailService;
use rac_backend::{db, AppState};

pub const ADMIN_EMAIL: &str = "admin@example.org";
pub const ADMIN_PASSWORD: &str = "password123";

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
            jwt_secret: "integration-secret".to_string(),
            jwt_expiry_hours: 1,
            reset_token_ttl_minutes: 60,
            password_hash_iterations: 1_000,
        },
        email: EmailConfig {
            sendgrid_api_key: None,
            from_email: "no-reply@example.org".to_string(),
            from_name: "Test".to_string(),
            admin_email: None,
        },
        rate_limit: RateLimitConfig::default(),
    }
}

/// Fresh database with one active admin
pub async fn test_state() -> web::Data<AppState> {
    test_state_with(test_config()).await
}

pub async fn test_state_with(config: Config) -> web::Data<AppState> {
    let mut options = ConnectOptions::new(config.database.url.clone());
    options.max_connections(1).min_connections(1).sqlx_logging(false);
    let conn = Database::connect(options).await.unwrap();
    db::run_migrations(&conn).await.unwrap();

    let email =
        EmailService::from_config(&config.app, &config.email, config.auth.reset_token_ttl_minutes).unwrap();
    let state = web::Data::new(AppState::new(conn, &config, email));

    state
        .auth
        .provision_admin(NewAdminRequest {
            email: ADMIN_EMAIL.to_string(),
            password: ADMIN_PASSWORD.to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
        })
        .await
        .unwrap();

    state
}

/// Builds the service the same way the server does
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(actix_web::middleware::ErrorHandlers::new().handler(
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    rac_backend::error::expose_internal_details,
                ))
                .app_data($state.clone())
                .configure(rac_backend::configure_app)
                .default_service(actix_web::web::to(rac_backend::routes::health::not_found)),
        )
        .await
    };
}

/// Logs the seeded admin in and returns the bearer header value
macro_rules! login {
    ($app:expr) => {{
        let req = actix_web::test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(serde_json::json!({
                "email": common::ADMIN_EMAIL,
                "password": common::ADMIN_PASSWORD,
            }))
            .to_request();
        let body: serde_json::Value = actix_web::test::call_and_read_body_json(&$app, req).await;
        format!("Bearer {}", body["data"]["token"].as_str().unwrap())
    }};
}
