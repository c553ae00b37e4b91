use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::models::users::UserRole;

/// Structure qui contient les infos de l'utilisateur authentifié
/// Utilisée comme extracteur dans les routes protégées
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: i32,
    pub email: String,
    pub role: UserRole,
}

impl AuthUser {
    /// Refuse (403) un utilisateur authentifié qui n'a pas le rôle attendu
    pub fn require_role(&self, role: UserRole) -> Result<(), ApiError> {
        if self.role == role {
            Ok(())
        } else {
            Err(ApiError::Forbidden(format!("Only {} accounts can do this", role.as_str())))
        }
    }
}

/// Extrait le token d'un header `Bearer <token>` : exactement deux parties séparées par un espace
pub fn bearer_token(header: &str) -> Option<&str> {
    let mut parts = header.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Some(token),
        _ => None,
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthUser, ApiError> {
    // 1. Extraire le header Authorization
    let header = req
        .headers()
        .get("Authorization")
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?
        .to_str()
        .map_err(|_| ApiError::Unauthorized("Invalid Authorization header".to_string()))?;

    // 2. Extraire le token (format: "Bearer <token>")
    let token = bearer_token(header).ok_or_else(|| {
        ApiError::Unauthorized("Invalid Authorization format (expected: Bearer <token>)".to_string())
    })?;

    // 3. Vérifier le token JWT avec les clés de l'application
    let config = req
        .app_data::<web::Data<AppConfig>>()
        .ok_or_else(|| ApiError::Internal("AppConfig is not registered".to_string()))?;

    let claims = config.jwt.verify_token(token).map_err(|e| {
        tracing::debug!("rejected token: {}", e);
        ApiError::Unauthorized("Invalid or expired token".to_string())
    })?;

    Ok(AuthUser {
        user_id: claims.sub,
        email: claims.email,
        role: claims.role,
    })
}

/// Implémentation de FromRequest pour AuthUser
/// Cela permet à Actix-Web d'extraire automatiquement AuthUser des requêtes
impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("Bearer"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer abc extra"), None);
        assert_eq!(bearer_token("abc"), None);
    }

    #[test]
    fn test_require_role() {
        let user = AuthUser {
            user_id: 1,
            email: "a@b.com".to_string(),
            role: UserRole::Student,
        };

        assert!(user.require_role(UserRole::Student).is_ok());
        assert!(matches!(user.require_role(UserRole::Instructor), Err(ApiError::Forbidden(_))));
    }
}
