//! Feedback repository for PostgreSQL operations
//!
//! Create and delete are two-row transactions: the feedback row plus the
//! back-reference on the rated order or order line. The back-reference
//! update is guarded (`WHERE feedback_id IS NULL`), so when two creators
//! race inside separate transactions exactly one wins and the loser's
//! insert rolls back.

use sqlx::PgPool;

use crate::data::postgres::PostgresError;
use crate::data::types::{FeedbackKind, FeedbackRow, NewFeedback};

fn feedback_from_row(
    (id, rating, comment, kind, customer_id, order_id, create_time): (
        i64,
        i32,
        Option<String>,
        String,
        i64,
        i64,
        i64,
    ),
) -> FeedbackRow {
    FeedbackRow {
        id,
        rating,
        comment,
        // The schema CHECK constraint keeps this parseable
        kind: FeedbackKind::parse(&kind).unwrap_or_default(),
        customer_id,
        order_id,
        create_time,
        products: Vec::new(),
    }
}

/// Get a feedback row by ID
pub async fn get_feedback(pool: &PgPool, id: i64) -> Result<Option<FeedbackRow>, PostgresError> {
    let row = sqlx::query_as::<_, (i64, i32, Option<String>, String, i64, i64, i64)>(
        "SELECT id, rating, comment, kind, customer_id, order_id, create_time FROM feedback WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(feedback_from_row))
}

/// List the newest feedback rows, optionally filtered by rating
pub async fn list_latest(
    pool: &PgPool,
    rating: Option<i32>,
    limit: i64,
) -> Result<Vec<FeedbackRow>, PostgresError> {
    let rows = match rating {
        Some(rating) => {
            sqlx::query_as::<_, (i64, i32, Option<String>, String, i64, i64, i64)>(
                "SELECT id, rating, comment, kind, customer_id, order_id, create_time FROM feedback WHERE rating = $1 ORDER BY create_time DESC, id DESC LIMIT $2",
            )
            .bind(rating)
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, (i64, i32, Option<String>, String, i64, i64, i64)>(
                "SELECT id, rating, comment, kind, customer_id, order_id, create_time FROM feedback ORDER BY create_time DESC, id DESC LIMIT $1",
            )
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
    };

    Ok(rows.into_iter().map(feedback_from_row).collect())
}

/// Insert order feedback and claim the order's back-reference, atomically
pub async fn create_order_feedback(
    pool: &PgPool,
    new: &NewFeedback,
) -> Result<FeedbackRow, PostgresError> {
    let now = chrono::Utc::now().timestamp_millis();

    let mut tx = pool.begin().await?;

    let feedback_id: i64 = sqlx::query_scalar(
        "INSERT INTO feedback (rating, comment, kind, customer_id, order_id, create_time) VALUES ($1, $2, 'order', $3, $4, $5) RETURNING id",
    )
    .bind(new.rating)
    .bind(new.comment.as_deref())
    .bind(new.customer_id)
    .bind(new.order_id)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    // Guarded claim: zero rows affected means another feedback got there first
    let updated =
        sqlx::query("UPDATE orders SET feedback_id = $1 WHERE id = $2 AND feedback_id IS NULL")
            .bind(feedback_id)
            .bind(new.order_id)
            .execute(&mut *tx)
            .await?;

    if updated.rows_affected() == 0 {
        // Dropping the transaction rolls the insert back
        return Err(PostgresError::Conflict(format!(
            "order {} already has feedback",
            new.order_id
        )));
    }

    tx.commit().await?;

    Ok(FeedbackRow {
        id: feedback_id,
        rating: new.rating,
        comment: new.comment.clone(),
        kind: FeedbackKind::Order,
        customer_id: new.customer_id,
        order_id: new.order_id,
        create_time: now,
        products: Vec::new(),
    })
}

/// Insert product feedback and claim the order line's back-reference, atomically
pub async fn create_product_feedback(
    pool: &PgPool,
    new: &NewFeedback,
    product_id: i64,
) -> Result<FeedbackRow, PostgresError> {
    let now = chrono::Utc::now().timestamp_millis();

    let mut tx = pool.begin().await?;

    let feedback_id: i64 = sqlx::query_scalar(
        "INSERT INTO feedback (rating, comment, kind, customer_id, order_id, create_time) VALUES ($1, $2, 'product', $3, $4, $5) RETURNING id",
    )
    .bind(new.rating)
    .bind(new.comment.as_deref())
    .bind(new.customer_id)
    .bind(new.order_id)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    let updated = sqlx::query(
        "UPDATE order_products SET feedback_id = $1 WHERE order_id = $2 AND product_id = $3 AND feedback_id IS NULL",
    )
    .bind(feedback_id)
    .bind(new.order_id)
    .bind(product_id)
    .execute(&mut *tx)
    .await?;

    if updated.rows_affected() == 0 {
        return Err(PostgresError::Conflict(format!(
            "product {} in order {} already has feedback",
            product_id, new.order_id
        )));
    }

    tx.commit().await?;

    Ok(FeedbackRow {
        id: feedback_id,
        rating: new.rating,
        comment: new.comment.clone(),
        kind: FeedbackKind::Product,
        customer_id: new.customer_id,
        order_id: new.order_id,
        create_time: now,
        products: Vec::new(),
    })
}

/// Update a feedback row's rating and comment
pub async fn update_feedback(
    pool: &PgPool,
    id: i64,
    rating: i32,
    comment: Option<&str>,
) -> Result<Option<FeedbackRow>, PostgresError> {
    let result = sqlx::query("UPDATE feedback SET rating = $1, comment = $2 WHERE id = $3")
        .bind(rating)
        .bind(comment)
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    get_feedback(pool, id).await
}

/// Clear the order's back-reference and delete the feedback row, atomically
pub async fn delete_order_feedback(
    pool: &PgPool,
    order_id: i64,
    feedback_id: i64,
) -> Result<bool, PostgresError> {
    let mut tx = pool.begin().await?;

    sqlx::query("UPDATE orders SET feedback_id = NULL WHERE id = $1 AND feedback_id = $2")
        .bind(order_id)
        .bind(feedback_id)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query("DELETE FROM feedback WHERE id = $1")
        .bind(feedback_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(result.rows_affected() > 0)
}

/// Clear the order line's back-reference and delete the feedback row, atomically
pub async fn delete_product_feedback(
    pool: &PgPool,
    order_id: i64,
    product_id: i64,
    feedback_id: i64,
) -> Result<bool, PostgresError> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "UPDATE order_products SET feedback_id = NULL WHERE order_id = $1 AND product_id = $2 AND feedback_id = $3",
    )
    .bind(order_id)
    .bind(product_id)
    .bind(feedback_id)
    .execute(&mut *tx)
    .await?;

    let result = sqlx::query("DELETE FROM feedback WHERE id = $1")
        .bind(feedback_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(result.rows_affected() > 0)
}
