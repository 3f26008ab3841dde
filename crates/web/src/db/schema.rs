//! Schema and insert statements for the sample store.

/// `customers`: one row per shopper.
pub const CREATE_CUSTOMERS_TABLE_SQL: &str = "
    CREATE TABLE customers (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT UNIQUE,
        city TEXT,
        signup_date DATE
    );
";

/// `orders`: `product_name` is free text, only `customer_id` is a reference.
pub const CREATE_ORDERS_TABLE_SQL: &str = "
    CREATE TABLE orders (
        id INTEGER PRIMARY KEY,
        customer_id INTEGER,
        product_name TEXT,
        quantity INTEGER CHECK (quantity > 0),
        price REAL CHECK (price >= 0),
        order_date DATE,
        FOREIGN KEY (customer_id) REFERENCES customers (id)
    );
";

/// `products`: catalog with list price and stock on hand.
pub const CREATE_PRODUCTS_TABLE_SQL: &str = "
    CREATE TABLE products (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        category TEXT,
        price REAL CHECK (price >= 0),
        stock INTEGER CHECK (stock >= 0)
    );
";

/// Creation statements in dependency order.
pub const ALL_TABLE_CREATION_SQL: &[&str] = &[
    CREATE_CUSTOMERS_TABLE_SQL,
    CREATE_ORDERS_TABLE_SQL,
    CREATE_PRODUCTS_TABLE_SQL,
];

pub const INSERT_CUSTOMER_SQL: &str = "INSERT INTO customers VALUES (?, ?, ?, ?, ?)";
pub const INSERT_ORDER_SQL: &str = "INSERT INTO orders VALUES (?, ?, ?, ?, ?, ?)";
pub const INSERT_PRODUCT_SQL: &str = "INSERT INTO products VALUES (?, ?, ?, ?, ?)";

/// Row counts of all three tables in a single round trip.
pub const TABLE_COUNTS_SQL: &str = "
    SELECT
        (SELECT COUNT(*) FROM customers),
        (SELECT COUNT(*) FROM orders),
        (SELECT COUNT(*) FROM products)
";
