//! Product repository for PostgreSQL operations

use sqlx::PgPool;

use crate::data::postgres::PostgresError;
use crate::data::types::ProductRow;

/// Get a product by ID
pub async fn get_product(pool: &PgPool, id: i64) -> Result<Option<ProductRow>, PostgresError> {
    let row = sqlx::query_as::<_, (i64, String, f64)>(
        "SELECT id, name, price FROM products WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|(id, name, price)| ProductRow { id, name, price }))
}

/// Get several products by ID in one query
///
/// Missing IDs are silently absent from the result; order is unspecified.
pub async fn list_by_ids(pool: &PgPool, ids: &[i64]) -> Result<Vec<ProductRow>, PostgresError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    // Build placeholders for IN clause with numbered parameters
    let placeholders: String = ids
        .iter()
        .enumerate()
        .map(|(i, _)| format!("${}", i + 1))
        .collect::<Vec<_>>()
        .join(",");
    let query = format!(
        "SELECT id, name, price FROM products WHERE id IN ({})",
        placeholders
    );

    let mut query_builder = sqlx::query_as::<_, (i64, String, f64)>(&query);
    for id in ids {
        query_builder = query_builder.bind(*id);
    }

    let rows = query_builder.fetch_all(pool).await?;

    Ok(rows
        .into_iter()
        .map(|(id, name, price)| ProductRow { id, name, price })
        .collect())
}
