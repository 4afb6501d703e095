use actix_web::{delete, get, patch, post, put, web, HttpResponse};
use uuid::Uuid;
use validator::Validate;

use crate::error::Result;
use crate::middleware::{AuthAdmin, OptionalAuthAdmin};
use crate::models::dto::{
    ApiResponse, ApprovedTestimonialQuery, CreateTestimonialRequest, TestimonialListQuery,
    UpdateTestimonialRequest,
};
use crate::AppState;

/// POST /testimonials (PUBLIC)
#[post("")]
pub async fn create_testimonial(
    state: web::Data<AppState>,
    body: web::Json<CreateTestimonialRequest>,
) -> Result<HttpResponse> {
    body.validate()?;

    let testimonial = state.testimonials.create(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::with_message(
        "Thank you for your testimonial! It will be reviewed and published soon.",
        testimonial,
    )))
}

/// GET /testimonials/approved (PUBLIC)
#[get("/approved")]
pub async fn list_approved(
    state: web::Data<AppState>,
    query: web::Query<ApprovedTestimonialQuery>,
) -> Result<HttpResponse> {
    query.validate()?;

    let page = state.testimonials.list_approved(query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::page(page)))
}

/// GET /testimonials (PROTECTED) - includes pending ones
#[get("")]
pub async fn list_testimonials(
    state: web::Data<AppState>,
    _auth: AuthAdmin,
    query: web::Query<TestimonialListQuery>,
) -> Result<HttpResponse> {
    query.validate()?;

    let page = state.testimonials.list(query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::page(page)))
}

/// GET /testimonials/stats (PROTECTED)
#[get("/stats")]
pub async fn testimonial_stats(state: web::Data<AppState>, _auth: AuthAdmin) -> Result<HttpResponse> {
    let stats = state.testimonials.stats().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::data(stats)))
}

/// GET /testimonials/{id} - pending testimonials are only visible to admins
#[get("/{id}")]
pub async fn get_testimonial(
    state: web::Data<AppState>,
    viewer: OptionalAuthAdmin,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let testimonial = state
        .testimonials
        .get_by_id(path.into_inner(), viewer.is_admin())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::data(testimonial)))
}

/// PUT /testimonials/{id} (PROTECTED)
#[put("/{id}")]
pub async fn update_testimonial(
    state: web::Data<AppState>,
    auth: AuthAdmin,
    path: web::Path<Uuid>,
    body: web::Json<UpdateTestimonialRequest>,
) -> Result<HttpResponse> {
    body.validate()?;

    let testimonial = state
        .testimonials
        .update(path.into_inner(), body.into_inner(), auth.id())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::with_message("Testimonial updated successfully", testimonial)))
}

/// PATCH /testimonials/{id}/approve (PROTECTED)
#[patch("/{id}/approve")]
pub async fn approve_testimonial(
    state: web::Data<AppState>,
    auth: AuthAdmin,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let testimonial = state.testimonials.approve(path.into_inner(), auth.id()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::with_message("Testimonial approved successfully", testimonial)))
}

/// PATCH /testimonials/{id}/reject (PROTECTED)
#[patch("/{id}/reject")]
pub async fn reject_testimonial(
    state: web::Data<AppState>,
    auth: AuthAdmin,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let testimonial = state.testimonials.reject(path.into_inner(), auth.id()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::with_message("Testimonial rejected successfully", testimonial)))
}

/// PATCH /testimonials/{id}/featured (PROTECTED)
#[patch("/{id}/featured")]
pub async fn toggle_featured(
    state: web::Data<AppState>,
    _auth: AuthAdmin,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let testimonial = state.testimonials.toggle_featured(path.into_inner()).await?;
    let message = if testimonial.testimonial.featured {
        "Testimonial featured successfully"
    } else {
        "Testimonial unfeatured successfully"
    };
    Ok(HttpResponse::Ok().json(ApiResponse::with_message(message, testimonial)))
}

/// DELETE /testimonials/{id} (PROTECTED)
#[delete("/{id}")]
pub async fn delete_testimonial(
    state: web::Data<AppState>,
    _auth: AuthAdmin,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    state.testimonials.delete(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Testimonial deleted successfully")))
}

pub fn testimonial_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/testimonials")
            .service(create_testimonial)
            .service(list_approved)
            .service(list_testimonials)
            .service(testimonial_stats)
            .service(get_testimonial)
            .service(update_testimonial)
            .service(approve_testimonial)
            .service(reject_testimonial)
            .service(toggle_featured)
            .service(delete_testimonial),
    );
}
