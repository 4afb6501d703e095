use actix_web::{get, web, HttpResponse};
use chrono::Utc;
use serde_json::json;

use crate::models::health::HealthResponse;
use crate::AppState;

#[get("/health")]
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let response = HealthResponse {
        status: "ok",
        message: "Server is running",
        timestamp: Utc::now(),
        environment: state.environment.clone(),
    };

    HttpResponse::Ok().json(response)
}

/// GET /api - endpoint directory
#[get("")]
pub async fn api_index() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "message": "Raising African Children API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health",
            "auth": "/api/auth",
            "blogs": "/api/blogs",
            "contacts": "/api/contacts",
            "testimonials": "/api/testimonials",
        },
    }))
}

/// Fallback for unknown routes
pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(json!({
        "success": false,
        "message": "Route not found",
    }))
}
