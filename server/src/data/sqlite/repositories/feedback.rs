//! Feedback repository for SQLite operations
//!
//! Create and delete are two-row transactions: the feedback row plus the
//! back-reference on the rated order or order line. The back-reference
//! update is guarded (`WHERE feedback_id IS NULL`), so when two creators
//! race inside separate transactions exactly one wins and the loser's
//! insert rolls back.

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
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
pub async fn get_feedback(pool: &SqlitePool, id: i64) -> Result<Option<FeedbackRow>, SqliteError> {
    let row = sqlx::query_as::<_, (i64, i32, Option<String>, String, i64, i64, i64)>(
        "SELECT id, rating, comment, kind, customer_id, order_id, create_time FROM feedback WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(feedback_from_row))
}

/// List the newest feedback rows, optionally filtered by rating
///
/// Ties on create_time break by descending id, so two rows created within
/// the same millisecond still list newest first.
pub async fn list_latest(
    pool: &SqlitePool,
    rating: Option<i32>,
    limit: i64,
) -> Result<Vec<FeedbackRow>, SqliteError> {
    let rows = match rating {
        Some(rating) => {
            sqlx::query_as::<_, (i64, i32, Option<String>, String, i64, i64, i64)>(
                "SELECT id, rating, comment, kind, customer_id, order_id, create_time FROM feedback WHERE rating = ? ORDER BY create_time DESC, id DESC LIMIT ?",
            )
            .bind(rating)
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, (i64, i32, Option<String>, String, i64, i64, i64)>(
                "SELECT id, rating, comment, kind, customer_id, order_id, create_time FROM feedback ORDER BY create_time DESC, id DESC LIMIT ?",
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
    pool: &SqlitePool,
    new: &NewFeedback,
) -> Result<FeedbackRow, SqliteError> {
    let now = chrono::Utc::now().timestamp_millis();

    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        "INSERT INTO feedback (rating, comment, kind, customer_id, order_id, create_time) VALUES (?, ?, 'order', ?, ?, ?)",
    )
    .bind(new.rating)
    .bind(new.comment.as_deref())
    .bind(new.customer_id)
    .bind(new.order_id)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    let feedback_id = result.last_insert_rowid();

    // Guarded claim: zero rows affected means another feedback got there first
    let updated =
        sqlx::query("UPDATE orders SET feedback_id = ? WHERE id = ? AND feedback_id IS NULL")
            .bind(feedback_id)
            .bind(new.order_id)
            .execute(&mut *tx)
            .await?;

    if updated.rows_affected() == 0 {
        // Dropping the transaction rolls the insert back
        return Err(SqliteError::Conflict(format!(
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
    pool: &SqlitePool,
    new: &NewFeedback,
    product_id: i64,
) -> Result<FeedbackRow, SqliteError> {
    let now = chrono::Utc::now().timestamp_millis();

    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        "INSERT INTO feedback (rating, comment, kind, customer_id, order_id, create_time) VALUES (?, ?, 'product', ?, ?, ?)",
    )
    .bind(new.rating)
    .bind(new.comment.as_deref())
    .bind(new.customer_id)
    .bind(new.order_id)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    let feedback_id = result.last_insert_rowid();

    let updated = sqlx::query(
        "UPDATE order_products SET feedback_id = ? WHERE order_id = ? AND product_id = ? AND feedback_id IS NULL",
    )
    .bind(feedback_id)
    .bind(new.order_id)
    .bind(product_id)
    .execute(&mut *tx)
    .await?;

    if updated.rows_affected() == 0 {
        return Err(SqliteError::Conflict(format!(
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
    pool: &SqlitePool,
    id: i64,
    rating: i32,
    comment: Option<&str>,
) -> Result<Option<FeedbackRow>, SqliteError> {
    let result = sqlx::query("UPDATE feedback SET rating = ?, comment = ? WHERE id = ?")
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
    pool: &SqlitePool,
    order_id: i64,
    feedback_id: i64,
) -> Result<bool, SqliteError> {
    let mut tx = pool.begin().await?;

    sqlx::query("UPDATE orders SET feedback_id = NULL WHERE id = ? AND feedback_id = ?")
        .bind(order_id)
        .bind(feedback_id)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query("DELETE FROM feedback WHERE id = ?")
        .bind(feedback_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(result.rows_affected() > 0)
}

/// Clear the order line's back-reference and delete the feedback row, atomically
pub async fn delete_product_feedback(
    pool: &SqlitePool,
    order_id: i64,
    product_id: i64,
    feedback_id: i64,
) -> Result<bool, SqliteError> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "UPDATE order_products SET feedback_id = NULL WHERE order_id = ? AND product_id = ? AND feedback_id = ?",
    )
    .bind(order_id)
    .bind(product_id)
    .bind(feedback_id)
    .execute(&mut *tx)
    .await?;

    let result = sqlx::query("DELETE FROM feedback WHERE id = ?")
        .bind(feedback_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sqlite::repositories::order::{get_order, get_order_product};

    async fn setup_test_pool() -> SqlitePool {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        sqlx::query(crate::data::sqlite::schema::SCHEMA)
            .execute(&pool)
            .await
            .unwrap();
        pool
    }

    async fn insert_order(pool: &SqlitePool, customer_id: i64) -> i64 {
        let result = sqlx::query(
            "INSERT INTO orders (customer_id, create_time, total_price) VALUES (?, 0, 9.99)",
        )
        .bind(customer_id)
        .execute(pool)
        .await
        .unwrap();
        result.last_insert_rowid()
    }

    fn order_feedback(order_id: i64, rating: i32) -> NewFeedback {
        NewFeedback {
            rating,
            comment: Some("prompt delivery".to_string()),
            customer_id: 1,
            order_id,
        }
    }

    #[tokio::test]
    async fn test_create_order_feedback() {
        let pool = setup_test_pool().await;
        let feedback = create_order_feedback(&pool, &order_feedback(1, 5))
            .await
            .unwrap();

        assert!(feedback.id > 0);
        assert_eq!(feedback.kind, FeedbackKind::Order);
        assert!(feedback.products.is_empty());

        let order = get_order(&pool, 1).await.unwrap().unwrap();
        assert_eq!(order.feedback_id, Some(feedback.id));
    }

    #[tokio::test]
    async fn test_create_order_feedback_conflict() {
        let pool = setup_test_pool().await;
        create_order_feedback(&pool, &order_feedback(1, 5))
            .await
            .unwrap();

        let second = create_order_feedback(&pool, &order_feedback(1, 2)).await;
        assert!(matches!(second, Err(SqliteError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_conflict_rolls_back_insert() {
        let pool = setup_test_pool().await;
        create_order_feedback(&pool, &order_feedback(1, 5))
            .await
            .unwrap();
        let _ = create_order_feedback(&pool, &order_feedback(1, 2)).await;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM feedback")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_create_product_feedback() {
        let pool = setup_test_pool().await;
        let feedback = create_product_feedback(&pool, &order_feedback(1, 4), 3)
            .await
            .unwrap();

        assert_eq!(feedback.kind, FeedbackKind::Product);

        let line = get_order_product(&pool, 1, 3).await.unwrap().unwrap();
        assert_eq!(line.feedback_id, Some(feedback.id));
    }

    #[tokio::test]
    async fn test_create_product_feedback_conflict_is_per_line() {
        let pool = setup_test_pool().await;
        create_product_feedback(&pool, &order_feedback(1, 4), 3)
            .await
            .unwrap();

        // Same line conflicts
        let same_line = create_product_feedback(&pool, &order_feedback(1, 1), 3).await;
        assert!(matches!(same_line, Err(SqliteError::Conflict(_))));

        // A different line of the same order is still free
        let other_line = create_product_feedback(&pool, &order_feedback(1, 3), 1).await;
        assert!(other_line.is_ok());
    }

    #[tokio::test]
    async fn test_update_feedback() {
        let pool = setup_test_pool().await;
        let feedback = create_order_feedback(&pool, &order_feedback(1, 5))
            .await
            .unwrap();

        let updated = update_feedback(&pool, feedback.id, 2, Some("changed my mind"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.rating, 2);
        assert_eq!(updated.comment, Some("changed my mind".to_string()));
        assert_eq!(updated.id, feedback.id);
    }

    #[tokio::test]
    async fn test_update_feedback_not_found() {
        let pool = setup_test_pool().await;
        let updated = update_feedback(&pool, 999, 3, None).await.unwrap();
        assert!(updated.is_none());
    }

    #[tokio::test]
    async fn test_delete_order_feedback() {
        let pool = setup_test_pool().await;
        let feedback = create_order_feedback(&pool, &order_feedback(1, 5))
            .await
            .unwrap();

        let deleted = delete_order_feedback(&pool, 1, feedback.id).await.unwrap();
        assert!(deleted);

        let order = get_order(&pool, 1).await.unwrap().unwrap();
        assert!(order.feedback_id.is_none());
        assert!(get_feedback(&pool, feedback.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_order_feedback_missing() {
        let pool = setup_test_pool().await;
        let deleted = delete_order_feedback(&pool, 1, 999).await.unwrap();
        assert!(!deleted);
    }

    #[tokio::test]
    async fn test_delete_product_feedback() {
        let pool = setup_test_pool().await;
        let feedback = create_product_feedback(&pool, &order_feedback(1, 4), 3)
            .await
            .unwrap();

        let deleted = delete_product_feedback(&pool, 1, 3, feedback.id)
            .await
            .unwrap();
        assert!(deleted);

        let line = get_order_product(&pool, 1, 3).await.unwrap().unwrap();
        assert!(line.feedback_id.is_none());
    }

    #[tokio::test]
    async fn test_list_latest_newest_first() {
        let pool = setup_test_pool().await;
        let first = create_order_feedback(&pool, &order_feedback(1, 5))
            .await
            .unwrap();
        let second = create_order_feedback(&pool, &order_feedback(2, 3))
            .await
            .unwrap();

        let rows = list_latest(&pool, None, 20).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, second.id);
        assert_eq!(rows[1].id, first.id);
    }

    #[tokio::test]
    async fn test_list_latest_rating_filter() {
        let pool = setup_test_pool().await;
        create_order_feedback(&pool, &order_feedback(1, 5))
            .await
            .unwrap();
        create_order_feedback(&pool, &order_feedback(2, 3))
            .await
            .unwrap();

        let rows = list_latest(&pool, Some(3), 20).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].rating, 3);
    }

    #[tokio::test]
    async fn test_list_latest_respects_limit() {
        let pool = setup_test_pool().await;
        create_order_feedback(&pool, &order_feedback(1, 5))
            .await
            .unwrap();
        create_order_feedback(&pool, &order_feedback(2, 4))
            .await
            .unwrap();
        let extra = insert_order(&pool, 1).await;
        let latest = create_order_feedback(&pool, &order_feedback(extra, 3))
            .await
            .unwrap();

        let rows = list_latest(&pool, None, 2).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, latest.id);
    }
}
