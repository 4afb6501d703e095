use actix_web::{get, post, put, web, HttpResponse};
use validator::Validate;

use crate::error::Result;
use crate::middleware::AuthAdmin;
use crate::models::dto::{
    ApiResponse, ChangePasswordRequest, ForgotPasswordRequest, LoginRequest, ResetPasswordRequest,
    ResetTokenStatus, UpdateProfileRequest, VerifyResetTokenQuery,
};
use crate::services::auth_service::RESET_REQUESTED;
use crate::AppState;

/// POST /auth/login (PUBLIC)
#[post("/login")]
pub async fn login(state: web::Data<AppState>, body: web::Json<LoginRequest>) -> Result<HttpResponse> {
    body.validate()?;

    let result = state.auth.authenticate(&body.email, &body.password).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::with_message("Login successful", result)))
}

/// GET /auth/me (PROTECTED)
#[get("/me")]
pub async fn me(auth: AuthAdmin) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::data(auth.admin))
}

/// PUT /auth/profile (PROTECTED) - names only
#[put("/profile")]
pub async fn update_profile(
    state: web::Data<AppState>,
    auth: AuthAdmin,
    body: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse> {
    body.validate()?;

    let admin = state.auth.update_profile(auth.id(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::with_message("Profile updated successfully", admin)))
}

/// PUT /auth/change-password (PROTECTED)
#[put("/change-password")]
pub async fn change_password(
    state: web::Data<AppState>,
    auth: AuthAdmin,
    body: web::Json<ChangePasswordRequest>,
) -> Result<HttpResponse> {
    body.validate()?;

    state.auth.change_password(auth.id(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Password changed successfully")))
}

/// POST /auth/forgot-password (PUBLIC) - same answer for every address
#[post("/forgot-password")]
pub async fn forgot_password(
    state: web::Data<AppState>,
    body: web::Json<ForgotPasswordRequest>,
) -> Result<HttpResponse> {
    body.validate()?;

    state.auth.request_password_reset(&body.email).await;
    Ok(HttpResponse::Ok().json(ApiResponse::message(RESET_REQUESTED)))
}

/// POST /auth/reset-password (PUBLIC)
#[post("/reset-password")]
pub async fn reset_password(
    state: web::Data<AppState>,
    body: web::Json<ResetPasswordRequest>,
) -> Result<HttpResponse> {
    body.validate()?;

    state.auth.reset_password(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Password has been reset successfully")))
}

/// GET /auth/verify-reset-token?email=..&token=.. (PUBLIC)
#[get("/verify-reset-token")]
pub async fn verify_reset_token(
    state: web::Data<AppState>,
    query: web::Query<VerifyResetTokenQuery>,
) -> Result<HttpResponse> {
    query.validate()?;

    let valid = state.auth.verify_reset_token(&query.email, &query.token).await;
    Ok(HttpResponse::Ok().json(ApiResponse::data(ResetTokenStatus { valid })))
}

pub fn auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(login)
            .service(me)
            .service(update_profile)
            .service(change_password)
            .service(forgot_password)
            .service(reset_password)
            .service(verify_reset_token),
    );
}
