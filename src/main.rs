mod config;
mod db;
mod error;
mod middleware;
mod migration;
mod models;
mod routes;
mod services;
mod utils;

#[cfg(test)]
mod tests;

use std::io;

use actix_web::{middleware::Logger, web, App, HttpServer};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::error::ApiError;

const JSON_LIMIT: usize = 8 * 1024 * 1024; // couvertures en data-URL

/// Corps JSON illisible ou requête mal formée -> 400 `{"error": ...}`
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT)
        .error_handler(|err, _req| ApiError::Validation(err.to_string()).into())
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| ApiError::Validation(err.to_string()).into())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "course_market=debug,actix_web=info,sea_orm=warn".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env().map_err(io::Error::other)?;

    info!("Connecting to database...");
    let db = db::establish_connection(&config.database_url, config.database_max_connections)
        .await
        .map_err(io::Error::other)?;
    info!("Database connected");

    let bind = (config.host.clone(), config.port);
    info!("Starting server on http://{}:{}", bind.0, bind.1);

    let db = web::Data::new(db);
    let config = web::Data::new(config);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(db.clone())
            .app_data(config.clone())
            .app_data(json_config())
            .app_data(query_config())
            .configure(routes::configure_routes)
    })
        .bind(bind)?
        .run()
        .await
}
