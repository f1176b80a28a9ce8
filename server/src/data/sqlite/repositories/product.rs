//! Product repository for SQLite operations

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::ProductRow;

/// Get a product by ID
pub async fn get_product(pool: &SqlitePool, id: i64) -> Result<Option<ProductRow>, SqliteError> {
    let row =
        sqlx::query_as::<_, (i64, String, f64)>("SELECT id, name, price FROM products WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;

    Ok(row.map(|(id, name, price)| ProductRow { id, name, price }))
}

/// Get several products by ID in one query
///
/// Missing IDs are silently absent from the result; order is unspecified.
pub async fn list_by_ids(pool: &SqlitePool, ids: &[i64]) -> Result<Vec<ProductRow>, SqliteError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = ids.iter().map(|_| "?").collect::<Vec<_>>().join(", ");
    let sql = format!(
        "SELECT id, name, price FROM products WHERE id IN ({})",
        placeholders
    );

    let mut query = sqlx::query_as::<_, (i64, String, f64)>(&sql);
    for id in ids {
        query = query.bind(*id);
    }

    let rows = query.fetch_all(pool).await?;

    Ok(rows
        .into_iter()
        .map(|(id, name, price)| ProductRow { id, name, price })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_test_pool() -> SqlitePool {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        sqlx::query(crate::data::sqlite::schema::SCHEMA)
            .execute(&pool)
            .await
            .unwrap();
        pool
    }

    #[tokio::test]
    async fn test_get_product() {
        let pool = setup_test_pool().await;
        let product = get_product(&pool, 2).await.unwrap();
        assert!(product.is_some());
        let product = product.unwrap();
        assert_eq!(product.name, "Whole Milk");
        assert_eq!(product.price, 1.20);
    }

    #[tokio::test]
    async fn test_get_product_not_found() {
        let pool = setup_test_pool().await;
        let product = get_product(&pool, 999).await.unwrap();
        assert!(product.is_none());
    }

    #[tokio::test]
    async fn test_list_by_ids() {
        let pool = setup_test_pool().await;
        let mut products = list_by_ids(&pool, &[1, 3]).await.unwrap();
        products.sort_by_key(|p| p.id);
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].name, "Sourdough Loaf");
        assert_eq!(products[1].name, "Free-Range Eggs");
    }

    #[tokio::test]
    async fn test_list_by_ids_empty_input() {
        let pool = setup_test_pool().await;
        let products = list_by_ids(&pool, &[]).await.unwrap();
        assert!(products.is_empty());
    }

    #[tokio::test]
    async fn test_list_by_ids_skips_missing() {
        let pool = setup_test_pool().await;
        let products = list_by_ids(&pool, &[2, 999]).await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id, 2);
    }
}
