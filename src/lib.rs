pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use actix_cors::Cors;
use actix_web::http::{header, StatusCode};
use actix_web::middleware::ErrorHandlers;
use actix_web::{web, App, HttpServer};
use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tracing_actix_web::TracingLogger;

use crate::config::Config;
use crate::error::AppError;
use crate::middleware::{RateLimit, RateLimiter};
use crate::services::{AuthService, BlogService, ContactService, EmailService, TestimonialService};

const MAX_JSON_BODY: usize = 10 * 1024 * 1024;

/// Shared by every worker through `web::Data`
pub struct AppState {
    pub auth: AuthService,
    pub blogs: BlogService,
    pub contacts: ContactService,
    pub testimonials: TestimonialService,
    pub environment: String,
    /// 500 responses carry the underlying error message (development only)
    pub expose_internal_errors: bool,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: &Config, email: EmailService) -> Self {
        AppState {
            auth: AuthService::new(db.clone(), &config.auth, email.clone()),
            blogs: BlogService::new(db.clone()),
            contacts: ContactService::new(db.clone(), email.clone()),
            testimonials: TestimonialService::new(db, email),
            environment: config.app.env.clone(),
            expose_internal_errors: config.is_development(),
        }
    }
}

/// Routes plus the extractor error handlers, so malformed bodies, query strings
/// and path ids answer with the usual JSON envelope
pub fn configure_app(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(MAX_JSON_BODY)
            .error_handler(|err, _req| AppError::BadRequest(format!("Invalid request body: {}", err)).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(format!("Invalid query parameters: {}", err)).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(format!("Invalid path parameter: {}", err)).into()),
    )
    .configure(routes::configure_routes);
}

fn cors(allowed_origins: &[String]) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION])
        .supports_credentials()
        .max_age(3600);
    for origin in allowed_origins {
        cors = cors.allowed_origin(origin);
    }
    cors
}

/// Connects, bootstraps the schema and serves until shutdown
pub async fn run(config: Config) -> std::io::Result<()> {
    // 1. Database
    tracing::info!("connecting to database");
    let db = db::establish_connection(&config.database)
        .await
        .map_err(std::io::Error::other)?;
    db::run_migrations(&db).await.map_err(std::io::Error::other)?;
    tracing::info!("database connected");

    // 2. Services
    let email = EmailService::from_config(&config.app, &config.email, config.auth.reset_token_ttl_minutes)
        .map_err(std::io::Error::other)?;
    let state = web::Data::new(AppState::new(db, &config, email));

    // 3. HTTP server
    let allowed_origins = config.app.allowed_origins.clone();
    let limiter = Arc::new(RateLimiter::new(config.rate_limit));
    tracing::info!(
        host = %config.app.host,
        port = config.app.port,
        environment = %config.app.env,
        rate_limit = config.rate_limit.max_requests,
        rate_limit_window_secs = config.rate_limit.window_seconds,
        "starting server"
    );

    HttpServer::new(move || {
        App::new()
            .wrap(RateLimit::new(limiter.clone()))
            .wrap(cors(&allowed_origins))
            .wrap(ErrorHandlers::new().handler(StatusCode::INTERNAL_SERVER_ERROR, error::expose_internal_details))
            .wrap(TracingLogger::default())
            .app_data(state.clone())
            .configure(configure_app)
            .default_service(web::to(routes::health::not_found))
    })
    .bind((config.app.host.as_str(), config.app.port))?
    .run()
    .await
}
