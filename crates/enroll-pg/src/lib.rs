//! PostgreSQL integration.
//!
//! ## Connectivity
//!
//! - [`db()`] — Establishes a database connection
//!
//! ## Schema
//!
//! - [`Schema`] — Table metadata and DDL generation
//! - [`migrate`] — Applies a [`Schema`] to a live connection
//!
//! ## Errors
//!
//! - [`Fault`] — Coarse classification of driver errors
//! - [`describe`] — Operator-facing text for a driver error
mod schema;

pub use schema::*;

use std::sync::Arc;
use tokio_postgres::Client;
use tokio_postgres::error::SqlState;

/// Establishes a database connection.
///
/// Connects to PostgreSQL at `url` and drives the connection on a
/// background task. Returns an `Arc<Client>` suitable for sharing
/// across async tasks.
pub async fn db(url: &str) -> Result<Arc<Client>, PgErr> {
    log::info!("connecting to database");
    let tls = tokio_postgres::tls::NoTls;
    let (client, connection) = tokio_postgres::connect(url, tls).await?;
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            log::error!("database connection closed: {}", e);
        }
    });
    client
        .execute("SET client_min_messages TO WARNING", &[])
        .await?;
    Ok(Arc::new(client))
}

/// PostgreSQL error type alias.
pub type PgErr = tokio_postgres::Error;

/// What a failed statement means to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// A unique index rejected the row.
    Conflict,
    /// The server could not be reached or the connection dropped.
    Unreachable,
    /// Anything else the server reported.
    Rejected,
}

impl From<&PgErr> for Fault {
    fn from(err: &PgErr) -> Self {
        match err.code() {
            Some(code) if *code == SqlState::UNIQUE_VIOLATION => Self::Conflict,
            Some(code) if code.code().starts_with("08") => Self::Unreachable,
            Some(code) if *code == SqlState::ADMIN_SHUTDOWN => Self::Unreachable,
            Some(code) if *code == SqlState::CANNOT_CONNECT_NOW => Self::Unreachable,
            Some(_) => Self::Rejected,
            None => Self::Unreachable,
        }
    }
}

/// Operator-facing text for a driver error.
///
/// The driver's own `Display` for server errors is just "db error", so
/// this pulls the SQLSTATE, message and constraint out of the server's
/// report when there is one.
pub fn describe(err: &PgErr) -> String {
    match err.as_db_error() {
        Some(db) => detail(db.code().code(), db.message(), db.constraint()),
        None => err.to_string(),
    }
}

fn detail(code: &str, message: &str, constraint: Option<&str>) -> String {
    match constraint {
        Some(constraint) => format!("{} ({}) on {}", message, code, constraint),
        None => format!("{} ({})", message, code),
    }
}

/// Table for registered user accounts.
#[rustfmt::skip]
pub const USERS:       &str = "users";
