//! Taxonomie des erreurs de l'API et conversion en réponse JSON `{"error": ...}`

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use sea_orm::{DbErr, SqlErr};
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("User is already an affiliate")]
    AlreadyAffiliate,

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(DbErr),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn not_found(what: &str) -> Self {
        ApiError::NotFound(format!("{what} not found"))
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        // Les index uniques garantissent les invariants même en cas de requêtes concurrentes
        if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
            tracing::debug!("unique constraint violation: {}", detail);
            return ApiError::Conflict("Resource already exists".to_string());
        }
        if let Some(SqlErr::ForeignKeyConstraintViolation(detail)) = err.sql_err() {
            tracing::debug!("foreign key violation: {}", detail);
            return ApiError::Conflict("Resource is still referenced".to_string());
        }
        ApiError::Database(err)
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("{field} is invalid"),
                })
            })
            .collect();
        messages.sort();
        ApiError::Validation(messages.join(", "))
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::AlreadyAffiliate => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Le détail des erreurs serveur est journalisé, jamais renvoyé au client
        let message = match self {
            ApiError::Database(_) | ApiError::Internal(_) => {
                error!("{}", self);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(serde_json::json!({ "error": message }))
    }
}
