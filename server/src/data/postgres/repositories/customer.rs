//! Customer repository for PostgreSQL operations
//!
//! Pure database access. Caching happens in the domain layer, which keys the
//! lookups it needs off these reads.

use sqlx::PgPool;

use crate::data::postgres::PostgresError;
use crate::data::types::CustomerRow;

/// Get a customer by ID
pub async fn get_customer(pool: &PgPool, id: i64) -> Result<Option<CustomerRow>, PostgresError> {
    let row = sqlx::query_as::<_, (i64, String, String, String, String)>(
        "SELECT id, first_name, last_name, username, password FROM customers WHERE id = $1",
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
    pool: &PgPool,
    username: &str,
) -> Result<Option<CustomerRow>, PostgresError> {
    let row = sqlx::query_as::<_, (i64, String, String, String, String)>(
        "SELECT id, first_name, last_name, username, password FROM customers WHERE username = $1",
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
