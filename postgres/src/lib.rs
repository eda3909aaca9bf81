//! `PostgreSQL` store implementations for Carebook.
//!
//! This crate implements the store traits from `carebook-core` on top of a
//! single connection pool. The concurrency-critical operations (slot claim
//! and release) are each one conditional `UPDATE` statement, so same-slot
//! mutual exclusion is delegated entirely to the database engine.
//!
//! # Example
//!
//! ```ignore
//! use carebook_postgres::PgStores;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let stores = PgStores::connect("postgres://localhost/carebook", 10).await?;
//!     stores.migrate().await?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod stores;

pub use stores::PgStores;
