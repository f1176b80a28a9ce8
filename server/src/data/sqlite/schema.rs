//! SQLite schema definitions
//!
//! Initial schema with all tables. No migrations needed for first version.

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Complete schema SQL
pub const SCHEMA: &str = r#"
-- =============================================================================
-- Infrastructure: Schema version tracking
-- =============================================================================
CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    version INTEGER NOT NULL,
    applied_at INTEGER NOT NULL,
    description TEXT
);

CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at INTEGER NOT NULL,
    checksum TEXT NOT NULL,
    execution_time_ms INTEGER,
    success INTEGER NOT NULL DEFAULT 1
);

-- =============================================================================
-- 1. Customers (must be before orders due to FK)
-- =============================================================================
CREATE TABLE IF NOT EXISTS customers (
    id INTEGER PRIMARY KEY,
    first_name TEXT NOT NULL CHECK(length(first_name) >= 1 AND length(first_name) <= 100),
    last_name TEXT NOT NULL CHECK(length(last_name) >= 1 AND length(last_name) <= 100),
    username TEXT NOT NULL UNIQUE CHECK(length(username) >= 1 AND length(username) <= 100),
    password TEXT NOT NULL
);

-- =============================================================================
-- 2. Products
-- =============================================================================
CREATE TABLE IF NOT EXISTS products (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL CHECK(length(name) >= 1 AND length(name) <= 200),
    price REAL NOT NULL CHECK(price >= 0)
);

-- =============================================================================
-- 3. Orders (references customers; feedback back-reference resolves at DML time)
-- =============================================================================
CREATE TABLE IF NOT EXISTS orders (
    id INTEGER PRIMARY KEY,
    customer_id INTEGER NOT NULL REFERENCES customers(id) ON DELETE CASCADE,
    create_time INTEGER NOT NULL,
    total_price REAL NOT NULL CHECK(total_price >= 0),
    feedback_id INTEGER REFERENCES feedback(id) ON DELETE SET NULL
);

CREATE INDEX IF NOT EXISTS idx_orders_customer ON orders(customer_id);

-- =============================================================================
-- 4. Order lines (one row per product in an order)
-- =============================================================================
CREATE TABLE IF NOT EXISTS order_products (
    order_id INTEGER NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
    product_id INTEGER NOT NULL REFERENCES products(id) ON DELETE CASCADE,
    amount INTEGER NOT NULL CHECK(amount > 0),
    feedback_id INTEGER REFERENCES feedback(id) ON DELETE SET NULL,
    PRIMARY KEY (order_id, product_id)
);

CREATE INDEX IF NOT EXISTS idx_order_products_product ON order_products(product_id);

-- =============================================================================
-- 5. Feedback (references customers and orders)
-- =============================================================================
CREATE TABLE IF NOT EXISTS feedback (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    rating INTEGER NOT NULL CHECK(rating BETWEEN 1 AND 5),
    comment TEXT,
    kind TEXT NOT NULL CHECK(kind IN ('order', 'product')),
    customer_id INTEGER NOT NULL REFERENCES customers(id) ON DELETE CASCADE,
    order_id INTEGER NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
    create_time INTEGER NOT NULL
);

-- Newest-first listing, ties broken by id
CREATE INDEX IF NOT EXISTS idx_feedback_latest ON feedback(create_time DESC, id DESC);
CREATE INDEX IF NOT EXISTS idx_feedback_rating ON feedback(rating, create_time DESC);

-- =============================================================================
-- Default Data (inserted in dependency order)
-- =============================================================================

-- 1. Demo customers
INSERT OR IGNORE INTO customers (id, first_name, last_name, username, password)
VALUES
    (1, 'Alice', 'Liddell', 'alice', 'wonderland'),
    (2, 'Bob', 'Builder', 'bob', 'builder');

-- 2. Demo products
INSERT OR IGNORE INTO products (id, name, price)
VALUES
    (1, 'Sourdough Loaf', 4.50),
    (2, 'Whole Milk', 1.20),
    (3, 'Free-Range Eggs', 3.80);

-- 3. Demo orders
INSERT OR IGNORE INTO orders (id, customer_id, create_time, total_price)
VALUES
    (1, 1, CAST(strftime('%s', 'now') AS INTEGER) * 1000, 12.10),
    (2, 2, CAST(strftime('%s', 'now') AS INTEGER) * 1000, 1.20);

-- 4. Demo order lines
INSERT OR IGNORE INTO order_products (order_id, product_id, amount)
VALUES
    (1, 1, 1),
    (1, 3, 2),
    (2, 2, 1);
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::assertions_on_constants)]
    fn test_schema_version_is_positive() {
        assert!(SCHEMA_VERSION > 0);
    }

    #[test]
    #[allow(clippy::const_is_empty)]
    fn test_schema_is_not_empty() {
        assert!(!SCHEMA.is_empty());
    }

    #[test]
    fn test_schema_contains_required_tables() {
        let required_tables = [
            "schema_version",
            "schema_migrations",
            "customers",
            "products",
            "orders",
            "order_products",
            "feedback",
        ];

        for table in required_tables {
            assert!(
                SCHEMA.contains(&format!("CREATE TABLE IF NOT EXISTS {}", table)),
                "Schema missing table: {}",
                table
            );
        }
    }

    #[test]
    fn test_schema_enforces_rating_bounds() {
        assert!(SCHEMA.contains("rating BETWEEN 1 AND 5"));
    }

    #[test]
    fn test_schema_contains_default_data() {
        assert!(
            SCHEMA.contains("INSERT OR IGNORE INTO customers"),
            "Schema missing demo customers"
        );
        assert!(
            SCHEMA.contains("INSERT OR IGNORE INTO products"),
            "Schema missing demo products"
        );
        assert!(
            SCHEMA.contains("INSERT OR IGNORE INTO orders"),
            "Schema missing demo orders"
        );
        assert!(
            SCHEMA.contains("INSERT OR IGNORE INTO order_products"),
            "Schema missing demo order lines"
        );
    }
}
