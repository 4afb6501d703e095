use actix_web::{delete, get, post, put, web, HttpResponse};
use uuid::Uuid;
use validator::Validate;

use crate::error::Result;
use crate::middleware::{AuthAdmin, OptionalAuthAdmin};
use crate::models::dto::{ApiResponse, BlogListQuery, CreateBlogRequest, LanguageQuery, UpdateBlogRequest};
use crate::AppState;

/// POST /blogs (PROTECTED)
#[post("")]
pub async fn create_blog(
    state: web::Data<AppState>,
    auth: AuthAdmin,
    body: web::Json<CreateBlogRequest>,
) -> Result<HttpResponse> {
    body.validate()?;

    let blog = state.blogs.create(body.into_inner(), auth.id()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::with_message("Blog created successfully", blog)))
}

/// GET /blogs - published posts, or everything for an admin asking for it
#[get("")]
pub async fn list_blogs(
    state: web::Data<AppState>,
    viewer: OptionalAuthAdmin,
    query: web::Query<BlogListQuery>,
) -> Result<HttpResponse> {
    query.validate()?;

    let page = state.blogs.list(query.into_inner(), viewer.is_admin()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::page(page)))
}

/// GET /blogs/categories?languageCode=fr
#[get("/categories")]
pub async fn get_categories(
    state: web::Data<AppState>,
    query: web::Query<LanguageQuery>,
) -> Result<HttpResponse> {
    let categories = state.blogs.categories(query.language_code.unwrap_or_default()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::data(categories)))
}

/// GET /blogs/tags?languageCode=fr
#[get("/tags")]
pub async fn get_tags(state: web::Data<AppState>, query: web::Query<LanguageQuery>) -> Result<HttpResponse> {
    let tags = state.blogs.tags(query.language_code.unwrap_or_default()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::data(tags)))
}

/// GET /blogs/slug/{slug} - counts a view
#[get("/slug/{slug}")]
pub async fn get_blog_by_slug(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<LanguageQuery>,
) -> Result<HttpResponse> {
    let blog = state.blogs.get_by_slug(&path, query.language_code).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::data(blog)))
}

/// GET /blogs/{id}
#[get("/{id}")]
pub async fn get_blog(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<LanguageQuery>,
) -> Result<HttpResponse> {
    let blog = state.blogs.get_by_id(path.into_inner(), query.language_code).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::data(blog)))
}

/// PUT /blogs/{id} (PROTECTED)
#[put("/{id}")]
pub async fn update_blog(
    state: web::Data<AppState>,
    _auth: AuthAdmin,
    path: web::Path<Uuid>,
    body: web::Json<UpdateBlogRequest>,
) -> Result<HttpResponse> {
    body.validate()?;

    let blog = state.blogs.update(path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::with_message("Blog updated successfully", blog)))
}

/// DELETE /blogs/{id} (PROTECTED)
#[delete("/{id}")]
pub async fn delete_blog(
    state: web::Data<AppState>,
    _auth: AuthAdmin,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    state.blogs.delete(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Blog deleted successfully")))
}

pub fn blog_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/blogs")
            .service(create_blog)
            .service(list_blogs)
            // Fixed segments before /{id}
            .service(get_categories)
            .service(get_tags)
            .service(get_blog_by_slug)
            .service(get_blog)
            .service(update_blog)
            .service(delete_blog),
    );
}
