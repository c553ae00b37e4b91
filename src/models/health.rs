use serde::Serialize;
use chrono::{DateTime, Utc};

/// Réponse de /api/health : "ok" si la base répond, "degraded" sinon
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub time: DateTime<Utc>,
}
