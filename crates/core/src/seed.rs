//! The fixed sample dataset.
//!
//! Every store is seeded with exactly these rows: 5 customers, 8 orders and
//! 7 products. Rows are kept as plain literals and parsed into the typed
//! models by [`SeedData::load`], which also checks the dataset's invariants.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::models::{Customer, Order, Product};
use crate::types::{CustomerId, Email, EmailError, OrderId, Price, ProductId};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Errors found while loading the seed rows.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SeedError {
    #[error("customer {id}: {source}")]
    InvalidEmail {
        id: i32,
        #[source]
        source: EmailError,
    },
    #[error("row {id} in {table}: invalid date {value:?}")]
    InvalidDate {
        table: &'static str,
        id: i32,
        value: &'static str,
    },
    #[error("duplicate {what} {value:?} in {table}")]
    Duplicate {
        table: &'static str,
        what: &'static str,
        value: String,
    },
    #[error("order {order}: customer {customer} does not exist")]
    DanglingCustomer { order: i32, customer: i32 },
    #[error("order {0}: quantity must be at least 1")]
    ZeroQuantity(i32),
}

struct CustomerRow {
    id: i32,
    name: &'static str,
    email: &'static str,
    city: &'static str,
    signup_date: &'static str,
}

struct OrderRow {
    id: i32,
    customer_id: i32,
    product_name: &'static str,
    quantity: u32,
    price_cents: u32,
    order_date: &'static str,
}

struct ProductRow {
    id: i32,
    name: &'static str,
    category: &'static str,
    price_cents: u32,
    stock: u32,
}

const CUSTOMERS: &[CustomerRow] = &[
    CustomerRow {
        id: 1,
        name: "Alice Johnson",
        email: "alice@email.com",
        city: "New York",
        signup_date: "2023-01-15",
    },
    CustomerRow {
        id: 2,
        name: "Bob Smith",
        email: "bob@email.com",
        city: "Los Angeles",
        signup_date: "2023-02-20",
    },
    CustomerRow {
        id: 3,
        name: "Carol Davis",
        email: "carol@email.com",
        city: "Chicago",
        signup_date: "2023-03-10",
    },
    CustomerRow {
        id: 4,
        name: "David Wilson",
        email: "david@email.com",
        city: "Houston",
        signup_date: "2023-04-05",
    },
    CustomerRow {
        id: 5,
        name: "Eva Brown",
        email: "eva@email.com",
        city: "Phoenix",
        signup_date: "2023-05-12",
    },
];

const ORDERS: &[OrderRow] = &[
    OrderRow {
        id: 1,
        customer_id: 1,
        product_name: "Laptop",
        quantity: 1,
        price_cents: 99_999,
        order_date: "2023-01-20",
    },
    OrderRow {
        id: 2,
        customer_id: 2,
        product_name: "Mouse",
        quantity: 2,
        price_cents: 2_999,
        order_date: "2023-02-25",
    },
    OrderRow {
        id: 3,
        customer_id: 1,
        product_name: "Keyboard",
        quantity: 1,
        price_cents: 7_999,
        order_date: "2023-03-15",
    },
    OrderRow {
        id: 4,
        customer_id: 3,
        product_name: "Monitor",
        quantity: 1,
        price_cents: 29_999,
        order_date: "2023-03-20",
    },
    OrderRow {
        id: 5,
        customer_id: 4,
        product_name: "Laptop",
        quantity: 1,
        price_cents: 119_999,
        order_date: "2023-04-10",
    },
    OrderRow {
        id: 6,
        customer_id: 5,
        product_name: "Headphones",
        quantity: 1,
        price_cents: 14_999,
        order_date: "2023-05-15",
    },
    OrderRow {
        id: 7,
        customer_id: 2,
        product_name: "Webcam",
        quantity: 1,
        price_cents: 8_999,
        order_date: "2023-06-01",
    },
    OrderRow {
        id: 8,
        customer_id: 3,
        product_name: "Tablet",
        quantity: 1,
        price_cents: 39_999,
        order_date: "2023-06-10",
    },
];

const PRODUCTS: &[ProductRow] = &[
    ProductRow {
        id: 1,
        name: "Laptop",
        category: "Electronics",
        price_cents: 99_999,
        stock: 50,
    },
    ProductRow {
        id: 2,
        name: "Mouse",
        category: "Electronics",
        price_cents: 2_999,
        stock: 100,
    },
    ProductRow {
        id: 3,
        name: "Keyboard",
        category: "Electronics",
        price_cents: 7_999,
        stock: 75,
    },
    ProductRow {
        id: 4,
        name: "Monitor",
        category: "Electronics",
        price_cents: 29_999,
        stock: 30,
    },
    ProductRow {
        id: 5,
        name: "Headphones",
        category: "Electronics",
        price_cents: 14_999,
        stock: 60,
    },
    ProductRow {
        id: 6,
        name: "Webcam",
        category: "Electronics",
        price_cents: 8_999,
        stock: 40,
    },
    ProductRow {
        id: 7,
        name: "Tablet",
        category: "Electronics",
        price_cents: 39_999,
        stock: 25,
    },
];

/// The parsed, validated sample dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedData {
    pub customers: Vec<Customer>,
    pub orders: Vec<Order>,
    pub products: Vec<Product>,
}

impl SeedData {
    /// Parse the fixed rows and check the dataset invariants.
    ///
    /// # Errors
    ///
    /// Returns a `SeedError` if a row fails to parse, an id or customer email
    /// repeats, an order has zero quantity, or an order references a customer
    /// that does not exist.
    pub fn load() -> Result<Self, SeedError> {
        let customers = CUSTOMERS
            .iter()
            .map(|row| {
                Ok(Customer {
                    id: CustomerId::new(row.id),
                    name: row.name.to_owned(),
                    email: Email::parse(row.email).map_err(|source| SeedError::InvalidEmail {
                        id: row.id,
                        source,
                    })?,
                    city: row.city.to_owned(),
                    signup_date: parse_date("customers", row.id, row.signup_date)?,
                })
            })
            .collect::<Result<Vec<_>, SeedError>>()?;

        let orders = ORDERS
            .iter()
            .map(|row| {
                Ok(Order {
                    id: OrderId::new(row.id),
                    customer_id: CustomerId::new(row.customer_id),
                    product_name: row.product_name.to_owned(),
                    quantity: row.quantity,
                    price: Price::from_cents(row.price_cents),
                    order_date: parse_date("orders", row.id, row.order_date)?,
                })
            })
            .collect::<Result<Vec<_>, SeedError>>()?;

        let products = PRODUCTS
            .iter()
            .map(|row| Product {
                id: ProductId::new(row.id),
                name: row.name.to_owned(),
                category: row.category.to_owned(),
                price: Price::from_cents(row.price_cents),
                stock: row.stock,
            })
            .collect();

        let data = Self {
            customers,
            orders,
            products,
        };
        data.validate()?;
        Ok(data)
    }

    /// Check uniqueness, quantities and order-to-customer references.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), SeedError> {
        unique("customers", "id", self.customers.iter().map(|c| c.id.to_string()))?;
        unique("customers", "email", self.customers.iter().map(|c| c.email.to_string()))?;
        unique("orders", "id", self.orders.iter().map(|o| o.id.to_string()))?;
        unique("products", "id", self.products.iter().map(|p| p.id.to_string()))?;

        let known: HashSet<CustomerId> = self.customers.iter().map(|c| c.id).collect();
        for order in &self.orders {
            if order.quantity == 0 {
                return Err(SeedError::ZeroQuantity(order.id.as_i32()));
            }
            if !known.contains(&order.customer_id) {
                return Err(SeedError::DanglingCustomer {
                    order: order.id.as_i32(),
                    customer: order.customer_id.as_i32(),
                });
            }
        }
        Ok(())
    }
}

fn parse_date(table: &'static str, id: i32, value: &'static str) -> Result<NaiveDate, SeedError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| SeedError::InvalidDate { table, id, value })
}

fn unique(
    table: &'static str,
    what: &'static str,
    values: impl Iterator<Item = String>,
) -> Result<(), SeedError> {
    let mut seen = HashSet::new();
    for value in values {
        if !seen.insert(value.clone()) {
            return Err(SeedError::Duplicate { table, what, value });
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_seed_counts() {
        let data = SeedData::load().unwrap();
        assert_eq!(data.customers.len(), 5);
        assert_eq!(data.orders.len(), 8);
        assert_eq!(data.products.len(), 7);
    }

    #[test]
    fn test_seed_values() {
        let data = SeedData::load().unwrap();
        let alice = &data.customers[0];
        assert_eq!(alice.name, "Alice Johnson");
        assert_eq!(alice.city, "New York");
        assert_eq!(
            alice.signup_date,
            NaiveDate::from_ymd_opt(2023, 1, 15).unwrap()
        );
        let mouse = &data.orders[1];
        assert_eq!(mouse.quantity, 2);
        assert_eq!(mouse.line_total().amount(), Decimal::new(5_998, 2));
    }

    #[test]
    fn test_laptop_revenue_is_largest() {
        let data = SeedData::load().unwrap();
        let revenue = |name: &str| {
            data.orders
                .iter()
                .filter(|o| o.product_name == name)
                .map(|o| o.line_total().amount())
                .sum::<Decimal>()
        };
        assert_eq!(revenue("Laptop"), Decimal::new(219_998, 2));
        for product in &data.products {
            if product.name != "Laptop" {
                assert!(revenue(&product.name) < revenue("Laptop"));
            }
        }
    }

    #[test]
    fn test_validate_rejects_dangling_customer() {
        let mut data = SeedData::load().unwrap();
        data.orders[0].customer_id = CustomerId::new(99);
        assert_eq!(
            data.validate(),
            Err(SeedError::DanglingCustomer {
                order: 1,
                customer: 99
            })
        );
    }

    #[test]
    fn test_validate_rejects_duplicate_email() {
        let mut data = SeedData::load().unwrap();
        data.customers[1].email = data.customers[0].email.clone();
        assert!(matches!(
            data.validate(),
            Err(SeedError::Duplicate { what: "email", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_quantity() {
        let mut data = SeedData::load().unwrap();
        data.orders[2].quantity = 0;
        assert_eq!(data.validate(), Err(SeedError::ZeroQuantity(3)));
    }
}
