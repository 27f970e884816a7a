use super::*;

/// Schema metadata for PostgreSQL tables.
///
/// Provides compile-time SQL generation for table creation and indexing.
/// All methods return `&'static str` so statements can be assembled with
/// `const_format::concatcp!` without runtime allocation.
///
/// This trait contains no I/O; [`migrate`] applies it to a live connection.
pub trait Schema {
    /// Returns the table name in the database.
    fn name() -> &'static str;
    /// Returns `CREATE TABLE IF NOT EXISTS` DDL statement.
    fn creates() -> &'static str;
    /// Returns `CREATE [UNIQUE] INDEX IF NOT EXISTS` statements for all indices.
    fn indices() -> &'static str;
    /// Returns PostgreSQL column types in declaration order.
    fn columns() -> &'static [tokio_postgres::types::Type];
}

/// Creates the table and its indices if they do not already exist.
pub async fn migrate<S: Schema>(client: &tokio_postgres::Client) -> Result<(), PgErr> {
    log::info!("creating table ({})", S::name());
    client.batch_execute(S::creates()).await?;
    log::info!("indexing table ({})", S::name());
    client.batch_execute(S::indices()).await
}
