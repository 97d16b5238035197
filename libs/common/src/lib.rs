//! Common library for the Tastebook backend
//!
//! This crate provides shared infrastructure used by the API service:
//! PostgreSQL connection pooling, schema migrations, and error types.

pub mod database;
pub mod error;
