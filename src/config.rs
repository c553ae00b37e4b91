// Configuration chargée une seule fois au démarrage (variables d'environnement / .env)

use std::env;
use std::str::FromStr;

use crate::utils::jwt::JwtKeys;

const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt: JwtKeys,
    pub password_iterations: u32,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    /// Lit la configuration depuis l'environnement.
    /// Pas de secret JWT par défaut : le serveur refuse de démarrer sans `JWT_SECRET`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = required("DATABASE_URL")?;

        let secret = required("JWT_SECRET")?;
        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::Invalid {
                name: "JWT_SECRET",
                reason: format!("expected at least {MIN_SECRET_LEN} bytes"),
            });
        }

        let ttl_hours: i64 = parsed("JWT_TTL_HOURS", 24)?;
        if ttl_hours <= 0 {
            return Err(ConfigError::Invalid {
                name: "JWT_TTL_HOURS",
                reason: "must be positive".to_string(),
            });
        }

        Ok(Self {
            database_url,
            database_max_connections: parsed("DATABASE_MAX_CONNECTIONS", 10)?,
            jwt: JwtKeys::new(&secret, ttl_hours),
            password_iterations: parsed("PASSWORD_ITERATIONS", crate::utils::password::DEFAULT_ITERATIONS)?,
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parsed("PORT", 8080)?,
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn parsed<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}
