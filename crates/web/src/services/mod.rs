//! Business logic services.
//!
//! - [`executor`] - Run SQL against a store and collect a row set
//! - [`workspace`] - Per-session state and the registry that owns it
//! - [`export`] - CSV rendering of a result

pub mod executor;
pub mod export;
pub mod workspace;
