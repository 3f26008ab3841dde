//! SQL Whisperer web console library.
//!
//! This crate provides the browser console and JSON API as a library,
//! allowing the router to be tested and the store and executor to be reused
//! by the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use routes::app;
