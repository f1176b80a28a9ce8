//! Order repository for PostgreSQL operations

use sqlx::PgPool;

use crate::data::postgres::PostgresError;
use crate::data::types::{OrderProductRow, OrderRow};

/// Get an order by ID
pub async fn get_order(pool: &PgPool, id: i64) -> Result<Option<OrderRow>, PostgresError> {
    let row = sqlx::query_as::<_, (i64, i64, i64, f64, Option<i64>)>(
        "SELECT id, customer_id, create_time, total_price, feedback_id FROM orders WHERE id = $1",
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
    pool: &PgPool,
    order_id: i64,
) -> Result<Vec<OrderProductRow>, PostgresError> {
    let rows = sqlx::query_as::<_, (i64, i64, i64, Option<i64>)>(
        "SELECT order_id, product_id, amount, feedback_id FROM order_products WHERE order_id = $1 ORDER BY product_id",
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
    pool: &PgPool,
    order_id: i64,
    product_id: i64,
) -> Result<Option<OrderProductRow>, PostgresError> {
    let row = sqlx::query_as::<_, (i64, i64, i64, Option<i64>)>(
        "SELECT order_id, product_id, amount, feedback_id FROM order_products WHERE order_id = $1 AND product_id = $2",
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
