//! SQLite backend for the portal store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Each table family has its own module of
//! synchronous query functions; [`SqliteStore`] runs them inside
//! `Connection::call`.

mod audit;
mod directory;
mod encode;
mod events;
mod payments;
mod requests;
mod rows;
mod schema;
mod store;
mod tax;
mod tenants;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
