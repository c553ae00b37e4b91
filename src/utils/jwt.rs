use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::models::users::UserRole;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,        // user_id
    pub email: String,
    pub role: UserRole,
    pub iat: i64,
    pub exp: i64,        // expiration timestamp
}

/// Clés HMAC dérivées de `JWT_SECRET`, construites une seule fois au démarrage
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtKeys {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Génère un JWT token pour un utilisateur
    pub fn generate_token(&self, user_id: i32, email: &str, role: UserRole) -> Result<String, String> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(self.ttl)
            .ok_or("Failed to calculate expiration")?
            .timestamp();

        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            role,
            iat: now.timestamp(),
            exp: expiration,
        };

        self.sign(&claims)
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| format!("Failed to generate token: {}", e))
    }

    /// Vérifie et décode un JWT token (signature + expiration)
    pub fn verify_token(&self, token: &str) -> Result<Claims, String> {
        decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(|e| format!("Invalid token: {}", e))
    }
}
