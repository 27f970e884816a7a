//! Registration Backend Server
//!
//! Wires configuration, the Postgres account store, and the signing key
//! into an actix-web server.
//!
//! ## Routes
//!
//! - `GET /health` — database liveness
//! - `POST /api/users` — register an account, see [`enroll_auth::register`]

mod config;

pub use config::*;

use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpResponse;
use actix_web::HttpServer;
use actix_web::Responder;
use actix_web::middleware::Logger;
use actix_web::web;
use enroll_auth::Account;
use enroll_auth::Crypto;
use enroll_auth::Registrar;
use std::sync::Arc;
use tokio_postgres::Client;

/// Why the server stopped or never started.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("signing key: {0}")]
    Key(#[from] enroll_auth::EmptyKey),
    #[error("database: {0}")]
    Database(#[from] enroll_pg::PgErr),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

async fn health(client: web::Data<Arc<Client>>) -> impl Responder {
    match client
        .execute("SELECT 1", &[])
        .await
        .inspect_err(|e| log::error!("health check failed: {}", e))
    {
        Ok(_) => HttpResponse::Ok().body("ok"),
        Err(_) => HttpResponse::ServiceUnavailable().body("database unavailable"),
    }
}

/// Loads configuration from the environment and serves until shutdown.
pub async fn run() -> Result<(), ServerError> {
    let config = Config::from_env()?;
    log::info!("loaded {:?}", config);
    serve(config).await
}

#[rustfmt::skip]
pub async fn serve(config: Config) -> Result<(), ServerError> {
    let crypto = Crypto::new(config.secret())?;
    let client = enroll_pg::db(config.database()).await?;
    enroll_pg::migrate::<Account>(&client).await?;
    let registrar = web::Data::new(Registrar::shared(client.clone(), crypto));
    let client = web::Data::new(client);
    log::info!("starting registration server on {}", config.bind());
    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%r %s %Ts"))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header(),
            )
            .app_data(registrar.clone())
            .app_data(client.clone())
            .route("/health", web::get().to(health))
            .configure(enroll_auth::routes::<Client>)
    });
    let server = match config.workers() {
        Some(n) => server.workers(n),
        None => server,
    };
    server.bind(config.bind())?.run().await?;
    Ok(())
}
