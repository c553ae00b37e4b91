pub mod affiliates;
pub mod auth;
pub mod chapters;
pub mod courses;
pub mod enrollments;
pub mod health;
pub mod orders;
pub mod payments;
pub mod product_details;
pub mod products;
pub mod progress;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(health::health_check)
            .configure(auth::auth_routes)
            .configure(courses::courses_routes)
            .configure(chapters::chapters_routes)
            .configure(products::products_routes)
            .configure(product_details::product_details_routes)
            .configure(orders::orders_routes)
            .configure(payments::payments_routes)
            .configure(enrollments::enrollments_routes)
            .configure(affiliates::affiliates_routes)
            .configure(progress::progress_routes)
    );
}
