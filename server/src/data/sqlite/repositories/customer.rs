//! Customer repository for SQLite operations
//!
//! Pure database access. Caching happens in the domain layer, which keys the
//! lookups it needs off these reads.

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::CustomerRow;

/// Get a customer by ID
pub async fn get_customer(pool: &SqlitePool, id: i64) -> Result<Option<CustomerRow>, SqliteError> {
    let row = sqlx::query_as::<_, (i64, String, String, String, String)>(
        "SELECT id, first_name, last_name, username, password FROM customers WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(
        row.map(|(id, first_name, last_name, username, password)| CustomerRow {
            id,
            first_name,
            last_name,
            username,
            password,
        }),
    )
}

/// Get a customer by username (exact, case-sensitive match)
pub async fn get_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<CustomerRow>, SqliteError> {
    let row = sqlx::query_as::<_, (i64, String, String, String, String)>(
        "SELECT id, first_name, last_name, username, password FROM customers WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(
        row.map(|(id, first_name, last_name, username, password)| CustomerRow {
            id,
            first_name,
            last_name,
            username,
            password,
        }),
    )
}
