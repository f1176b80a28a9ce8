//! PostgreSQL schema definitions
//!
//! Initial schema with all tables. Compatible with SQLite schema structure.

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Complete schema SQL for PostgreSQL
pub const SCHEMA: &str = r#"
-- =============================================================================
-- Infrastructure: Schema version tracking
-- =============================================================================
CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    version INTEGER NOT NULL,
    applied_at BIGINT NOT NULL,
    description TEXT
);

CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at BIGINT NOT NULL,
    checksum TEXT NOT NULL,
    execution_time_ms INTEGER,
    success BOOLEAN NOT NULL DEFAULT TRUE
);

-- =============================================================================
-- 1. Customers (must be before orders due to FK)
-- =============================================================================
CREATE TABLE IF NOT EXISTS customers (
    id BIGSERIAL PRIMARY KEY,
    first_name TEXT NOT NULL CHECK(length(first_name) >= 1 AND length(first_name) <= 100),
    last_name TEXT NOT NULL CHECK(length(last_name) >= 1 AND length(last_name) <= 100),
    username TEXT NOT NULL UNIQUE CHECK(length(username) >= 1 AND length(username) <= 100),
    password TEXT NOT NULL
);

-- =============================================================================
-- 2. Products
-- =============================================================================
CREATE TABLE IF NOT EXISTS products (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL CHECK(length(name) >= 1 AND length(name) <= 200),
    price DOUBLE PRECISION NOT NULL CHECK(price >= 0)
);

-- =============================================================================
-- 3. Orders (feedback back-reference FK is added after feedback exists)
-- =============================================================================
CREATE TABLE IF NOT EXISTS orders (
    id BIGSERIAL PRIMARY KEY,
    customer_id BIGINT NOT NULL REFERENCES customers(id) ON DELETE CASCADE,
    create_time BIGINT NOT NULL,
    total_price DOUBLE PRECISION NOT NULL CHECK(total_price >= 0),
    feedback_id BIGINT
);

CREATE INDEX IF NOT EXISTS idx_orders_customer ON orders(customer_id);

-- =============================================================================
-- 4. Order lines (one row per product in an order)
-- =============================================================================
CREATE TABLE IF NOT EXISTS order_products (
    order_id BIGINT NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
    product_id BIGINT NOT NULL REFERENCES products(id) ON DELETE CASCADE,
    amount BIGINT NOT NULL CHECK(amount > 0),
    feedback_id BIGINT,
    PRIMARY KEY (order_id, product_id)
);

CREATE INDEX IF NOT EXISTS idx_order_products_product ON order_products(product_id);

-- =============================================================================
-- 5. Feedback (references customers and orders)
-- =============================================================================
CREATE TABLE IF NOT EXISTS feedback (
    id BIGSERIAL PRIMARY KEY,
    rating INTEGER NOT NULL CHECK(rating BETWEEN 1 AND 5),
    comment TEXT,
    kind TEXT NOT NULL CHECK(kind IN ('order', 'product')),
    customer_id BIGINT NOT NULL REFERENCES customers(id) ON DELETE CASCADE,
    order_id BIGINT NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
    create_time BIGINT NOT NULL
);

-- Newest-first listing, ties broken by id
CREATE INDEX IF NOT EXISTS idx_feedback_latest ON feedback(create_time DESC, id DESC);
CREATE INDEX IF NOT EXISTS idx_feedback_rating ON feedback(rating, create_time DESC);

-- Back-reference FKs close the orders <-> feedback cycle; only applied on a
-- fresh database, so plain ALTER TABLE is safe here
ALTER TABLE orders
    ADD CONSTRAINT fk_orders_feedback
    FOREIGN KEY (feedback_id) REFERENCES feedback(id) ON DELETE SET NULL;

ALTER TABLE order_products
    ADD CONSTRAINT fk_order_products_feedback
    FOREIGN KEY (feedback_id) REFERENCES feedback(id) ON DELETE SET NULL;
"#;

/// Default data SQL for PostgreSQL (inserted separately after schema)
pub const DEFAULT_DATA: &str = r#"
-- 1. Demo customers
INSERT INTO customers (id, first_name, last_name, username, password)
VALUES
    (1, 'Alice', 'Liddell', 'alice', 'wonderland'),
    (2, 'Bob', 'Builder', 'bob', 'builder')
ON CONFLICT (id) DO NOTHING;

-- 2. Demo products
INSERT INTO products (id, name, price)
VALUES
    (1, 'Sourdough Loaf', 4.50),
    (2, 'Whole Milk', 1.20),
    (3, 'Free-Range Eggs', 3.80)
ON CONFLICT (id) DO NOTHING;

-- 3. Demo orders
INSERT INTO orders (id, customer_id, create_time, total_price)
VALUES
    (1, 1, EXTRACT(EPOCH FROM NOW())::BIGINT * 1000, 12.10),
    (2, 2, EXTRACT(EPOCH FROM NOW())::BIGINT * 1000, 1.20)
ON CONFLICT (id) DO NOTHING;

-- 4. Demo order lines
INSERT INTO order_products (order_id, product_id, amount)
VALUES
    (1, 1, 1),
    (1, 3, 2),
    (2, 2, 1)
ON CONFLICT (order_id, product_id) DO NOTHING;

-- Explicit-id inserts do not advance the sequences, so realign them
SELECT setval(pg_get_serial_sequence('customers', 'id'), (SELECT COALESCE(MAX(id), 1) FROM customers));
SELECT setval(pg_get_serial_sequence('products', 'id'), (SELECT COALESCE(MAX(id), 1) FROM products));
SELECT setval(pg_get_serial_sequence('orders', 'id'), (SELECT COALESCE(MAX(id), 1) FROM orders));
"#;
