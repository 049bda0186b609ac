//! Caselog data layer.
//!
//! Postgres access through sqlx: entity models and DTOs under [`models`],
//! plain CRUD repositories under [`repositories`], and the transactional
//! workflow engines (review requests, note lifecycle, journal aggregation)
//! under [`workflow`]. Repositories are zero-sized structs whose async
//! methods take `&PgPool` as their first argument; every multi-row mutation
//! lives in a workflow engine and owns exactly one transaction.

use sqlx::postgres::PgPoolOptions;

pub mod error;
pub mod models;
pub mod repositories;
pub mod workflow;

pub use error::{DbError, DbResult};

pub type DbPool = sqlx::PgPool;

/// Default page size for paginated listings.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Maximum page size a client may request.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Verify the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply all pending migrations from the workspace `migrations/` directory.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}

/// Clamp a requested page number to 1-based.
pub fn clamp_page(page: Option<i64>) -> i64 {
    page.unwrap_or(1).max(1)
}

/// Clamp a requested page size to `1..=MAX_PAGE_SIZE`.
pub fn clamp_page_size(page_size: Option<i64>) -> i64 {
    page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_clamping() {
        assert_eq!(clamp_page(None), 1);
        assert_eq!(clamp_page(Some(0)), 1);
        assert_eq!(clamp_page(Some(-3)), 1);
        assert_eq!(clamp_page(Some(7)), 7);
    }

    #[test]
    fn test_page_size_clamping() {
        assert_eq!(clamp_page_size(None), DEFAULT_PAGE_SIZE);
        assert_eq!(clamp_page_size(Some(0)), 1);
        assert_eq!(clamp_page_size(Some(1000)), MAX_PAGE_SIZE);
        assert_eq!(clamp_page_size(Some(50)), 50);
    }
}
