use actix_web::{get, web, HttpResponse};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use tracing::warn;

use crate::models::health::HealthResponse;

#[get("/health")]
pub async fn health_check(db: web::Data<DatabaseConnection>) -> HttpResponse {
    let (status, database) = match db.ping().await {
        Ok(()) => ("ok", "up"),
        Err(e) => {
            warn!("Health check: database unreachable: {}", e);
            ("degraded", "down")
        }
    };

    let response = HealthResponse {
        status,
        database,
        time: Utc::now(),
    };

    if database == "up" {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}
