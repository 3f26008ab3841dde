//! Rows of the sample dataset.
//!
//! These are created once when a store is seeded and never change afterwards.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{CustomerId, Email, OrderId, Price, ProductId};

/// A row of the `customers` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub email: Email,
    pub city: String,
    pub signup_date: NaiveDate,
}

/// A row of the `orders` table.
///
/// `product_name` is denormalized text, not a reference into `products`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub product_name: String,
    /// Always at least 1.
    pub quantity: u32,
    /// Unit price at the time of the order.
    pub price: Price,
    pub order_date: NaiveDate,
}

impl Order {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// A row of the `products` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub price: Price,
    pub stock: u32,
}
