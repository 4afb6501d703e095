// ============================================================================
// MODELS - MAIN MODULE
// ============================================================================
//
// Description:
//   Entry point for every data model.
//   Each entity maps to one table through SeaORM.
//
// Modules:
//   - admin : Back-office accounts (credentials + password reset state)
//   - blog : Language-independent blog "shell" (slug, status, views)
//   - blog_translation : One localized rendering of a blog (one per language)
//   - contact : Visitor contact inquiries (read / unread)
//   - testimonial : Visitor testimonials (approval workflow + featured flag)
//   - dto : Request / response shapes for the API
//   - health : Health check API
//
// Notes:
//   - Every id is a UUID v4 generated by the service layer
//   - Relations are declared on each entity (blog -> translations is CASCADE)
//   - Sensitive admin columns are never serialized
//
// ============================================================================

pub mod admin;
pub mod blog;
pub mod blog_translation;
pub mod contact;
pub mod dto;
pub mod health;
pub mod testimonial;
