//! Core types and trait definitions for the city portal.
//!
//! No HTTP or database dependencies live here; every other crate in the
//! workspace builds on these types.

pub mod alert;
pub mod amount;
pub mod directory;
pub mod error;
pub mod payment;
pub mod project;
pub mod request;
pub mod session;
pub mod store;
pub mod tax;
pub mod tenant;

pub use amount::Amount;
pub use error::{Error, Result};
