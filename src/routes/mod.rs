pub mod auth;
pub mod blogs;
pub mod contacts;
pub mod health;
pub mod testimonials;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health::health_check)
        .service(
            web::scope("/api")
                .service(health::api_index)
                .configure(auth::auth_routes)
                .configure(blogs::blog_routes)
                .configure(contacts::contact_routes)
                .configure(testimonials::testimonial_routes),
        );
}
