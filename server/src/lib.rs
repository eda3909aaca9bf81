//! Carebook HTTP server - appointment slot booking over REST.
//!
//! Thin Axum shell over `carebook-core`:
//!
//! - HTTP handlers parse and validate requests, dispatch to the booking
//!   service or readers, and map domain errors to responses.
//! - State holds the stores as trait objects, so tests run the same router
//!   over the in-memory stores from `carebook-testing`.
//!
//! The concurrency-sensitive logic lives entirely in `carebook-core` and the
//! store implementations; nothing in this crate holds a read result across a
//! write.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod server;

pub use config::Config;
pub use error::AppError;
pub use server::{build_router, AppState};
