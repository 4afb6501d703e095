use actix_web::{delete, get, patch, post, put, web, HttpResponse};
use uuid::Uuid;
use validator::Validate;

use crate::error::Result;
use crate::middleware::AuthAdmin;
use crate::models::dto::{
    ApiResponse, ContactListQuery, CreateContactRequest, SubmitterInfo, UpdateContactRequest,
};
use crate::AppState;

/// POST /contacts (PUBLIC) - contact form
#[post("")]
pub async fn create_contact(
    state: web::Data<AppState>,
    submitter: SubmitterInfo,
    body: web::Json<CreateContactRequest>,
) -> Result<HttpResponse> {
    body.validate()?;

    let contact = state.contacts.create(body.into_inner(), submitter).await?;
    Ok(HttpResponse::Created().json(ApiResponse::with_message(
        "Thank you for contacting us. We will get back to you soon!",
        contact,
    )))
}

/// GET /contacts (PROTECTED)
#[get("")]
pub async fn list_contacts(
    state: web::Data<AppState>,
    _auth: AuthAdmin,
    query: web::Query<ContactListQuery>,
) -> Result<HttpResponse> {
    query.validate()?;

    let page = state.contacts.list(query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::page(page)))
}

/// GET /contacts/stats (PROTECTED)
#[get("/stats")]
pub async fn contact_stats(state: web::Data<AppState>, _auth: AuthAdmin) -> Result<HttpResponse> {
    let stats = state.contacts.stats().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::data(stats)))
}

/// GET /contacts/{id} (PROTECTED)
#[get("/{id}")]
pub async fn get_contact(
    state: web::Data<AppState>,
    _auth: AuthAdmin,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let contact = state.contacts.get_by_id(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::data(contact)))
}

/// PUT /contacts/{id} (PROTECTED) - only the read state can change
#[put("/{id}")]
pub async fn update_contact(
    state: web::Data<AppState>,
    _auth: AuthAdmin,
    path: web::Path<Uuid>,
    body: web::Json<UpdateContactRequest>,
) -> Result<HttpResponse> {
    let contact = state.contacts.update(path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::with_message("Contact updated successfully", contact)))
}

/// PATCH /contacts/{id}/read (PROTECTED)
#[patch("/{id}/read")]
pub async fn mark_as_read(
    state: web::Data<AppState>,
    _auth: AuthAdmin,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let contact = state.contacts.mark_as_read(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::with_message("Contact marked as read", contact)))
}

/// PATCH /contacts/{id}/unread (PROTECTED)
#[patch("/{id}/unread")]
pub async fn mark_as_unread(
    state: web::Data<AppState>,
    _auth: AuthAdmin,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let contact = state.contacts.mark_as_unread(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::with_message("Contact marked as unread", contact)))
}

/// DELETE /contacts/{id} (PROTECTED)
#[delete("/{id}")]
pub async fn delete_contact(
    state: web::Data<AppState>,
    _auth: AuthAdmin,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    state.contacts.delete(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Contact deleted successfully")))
}

pub fn contact_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/contacts")
            .service(create_contact)
            .service(list_contacts)
            .service(contact_stats)
            .service(get_contact)
            .service(update_contact)
            .service(mark_as_read)
            .service(mark_as_unread)
            .service(delete_contact),
    );
}
