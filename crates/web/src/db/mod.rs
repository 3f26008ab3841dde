//! The per-session sample store.
//!
//! # Database: in-memory SQLite
//!
//! Each [`SampleStore`] is its own private `sqlite::memory:` database, created
//! and seeded when a workspace opens and dropped when the workspace goes away.
//! Nothing is shared between stores and nothing touches disk.
//!
//! ## Tables
//!
//! - `customers` - 5 rows
//! - `orders` - 8 rows, `customer_id` references `customers`
//! - `products` - 7 rows

pub mod schema;

use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use thiserror::Error;
use tracing::{debug, instrument};

use sql_whisperer_core::seed::{SeedData, SeedError};

/// Errors that can occur while creating or inspecting a store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The fixed seed rows failed validation.
    #[error("invalid seed data: {0}")]
    Seed(#[from] SeedError),
}

/// Row counts of the three sample tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableCounts {
    pub customers: i64,
    pub orders: i64,
    pub products: i64,
}

/// An isolated, seeded in-memory database.
///
/// The pool holds exactly one connection that never expires: an in-memory
/// SQLite database lives only as long as the connection that created it.
#[derive(Debug, Clone)]
pub struct SampleStore {
    pool: SqlitePool,
}

impl SampleStore {
    /// Create a fresh store and seed it with the sample dataset.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Seed` if the seed rows are inconsistent and
    /// `StoreError::Database` if the schema or inserts fail.
    #[instrument]
    pub async fn open() -> Result<Self, StoreError> {
        let data = SeedData::load()?;
        let store = Self::open_empty().await?;
        store.seed(&data).await?;
        debug!(
            customers = data.customers.len(),
            orders = data.orders.len(),
            products = data.products.len(),
            "Sample store seeded"
        );
        Ok(store)
    }

    /// Create a store with the schema but no rows.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the connection or schema fails.
    pub async fn open_empty() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await?;

        for statement in schema::ALL_TABLE_CREATION_SQL {
            sqlx::query(statement).execute(&pool).await?;
        }

        Ok(Self { pool })
    }

    /// Insert the seed rows in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` on any failed insert, including a
    /// foreign-key violation from an order whose customer is missing. Nothing
    /// is inserted in that case.
    pub async fn seed(&self, data: &SeedData) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        for customer in &data.customers {
            sqlx::query(schema::INSERT_CUSTOMER_SQL)
                .bind(customer.id)
                .bind(&customer.name)
                .bind(&customer.email)
                .bind(&customer.city)
                .bind(customer.signup_date)
                .execute(&mut *tx)
                .await?;
        }

        for order in &data.orders {
            sqlx::query(schema::INSERT_ORDER_SQL)
                .bind(order.id)
                .bind(order.customer_id)
                .bind(&order.product_name)
                .bind(i64::from(order.quantity))
                .bind(order.price.to_f64())
                .bind(order.order_date)
                .execute(&mut *tx)
                .await?;
        }

        for product in &data.products {
            sqlx::query(schema::INSERT_PRODUCT_SQL)
                .bind(product.id)
                .bind(&product.name)
                .bind(&product.category)
                .bind(product.price.to_f64())
                .bind(i64::from(product.stock))
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Current row counts of the three tables.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the count query fails.
    pub async fn counts(&self) -> Result<TableCounts, StoreError> {
        let (customers, orders, products): (i64, i64, i64) =
            sqlx::query_as(schema::TABLE_COUNTS_SQL)
                .fetch_one(&self.pool)
                .await?;

        Ok(TableCounts {
            customers,
            orders,
            products,
        })
    }

    /// The underlying single-connection pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the connection, discarding the database.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }
}
