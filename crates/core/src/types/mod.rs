//! Core types for SQL Whisperer.
//!
//! This module provides type-safe wrappers for the sample dataset's columns.

pub mod email;
pub mod id;
pub mod price;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::{Price, PriceError};
