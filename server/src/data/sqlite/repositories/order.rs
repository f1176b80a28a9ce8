//! Order repository for SQLite operations

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::{OrderProductRow, OrderRow};

/// Get an order by ID
pub async fn get_order(pool: &SqlitePool, id: i64) -> Result<Option<OrderRow>, SqliteError> {
    let row = sqlx::query_as::<_, (i64, i64, i64, f64, Option<i64>)>(
        "SELECT id, customer_id, create_time, total_price, feedback_id FROM orders WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(
        row.map(|(id, customer_id, create_time, total_price, feedback_id)| OrderRow {
            id,
            customer_id,
            create_time,
            total_price,
            feedback_id,
        }),
    )
}

/// List the lines of an order, ordered by product ID for stable output
pub async fn list_order_products(
    pool: &SqlitePool,
    order_id: i64,
) -> Result<Vec<OrderProductRow>, SqliteError> {
    let rows = sqlx::query_as::<_, (i64, i64, i64, Option<i64>)>(
        "SELECT order_id, product_id, amount, feedback_id FROM order_products WHERE order_id = ? ORDER BY product_id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(order_id, product_id, amount, feedback_id)| OrderProductRow {
            order_id,
            product_id,
            amount,
            feedback_id,
        })
        .collect())
}

/// Get one order line by its order and product pair
pub async fn get_order_product(
    pool: &SqlitePool,
    order_id: i64,
    product_id: i64,
) -> Result<Option<OrderProductRow>, SqliteError> {
    let row = sqlx::query_as::<_, (i64, i64, i64, Option<i64>)>(
        "SELECT order_id, product_id, amount, feedback_id FROM order_products WHERE order_id = ? AND product_id = ?",
    )
    .bind(order_id)
    .bind(product_id)
    .fetch_optional(pool)
    .await?;

    Ok(
        row.map(|(order_id, product_id, amount, feedback_id)| OrderProductRow {
            order_id,
            product_id,
            amount,
            feedback_id,
        }),
    )
}
