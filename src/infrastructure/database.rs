use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};

/// Use `max_connections = 1` for `sqlite::memory:`; each connection would
/// otherwise open its own empty database.
///
/// # Errors
///
/// Returns the driver error when the database cannot be opened.
pub async fn init_pool(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .connect(database_url)
        .await
}

/// # Errors
///
/// Returns the migration error when the schema cannot be brought up to date.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
