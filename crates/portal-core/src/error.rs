//! Error types for `portal-core`.
//!
//! These are the domain refusals every layer agrees on. Storage backends wrap
//! them; the API layer maps them onto HTTP statuses.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  #[error("tenant not found: {0:?}")]
  TenantNotFound(String),

  /// The record does not exist, or it belongs to a different tenant.
  #[error("record not found")]
  RecordNotFound,

  #[error("unauthorized")]
  Unauthorized,

  #[error("payment {0} is already verified")]
  AlreadyVerified(Uuid),

  #[error("cannot move from {from} to {to}")]
  InvalidTransition { from: String, to: String },

  #[error("invalid {field}: {message}")]
  Validation {
    field:   &'static str,
    message: String,
  },

  #[error("conflict: {0}")]
  Conflict(String),
}

impl Error {
  pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
    Self::Validation { field, message: message.into() }
  }

  pub fn transition(from: impl ToString, to: impl ToString) -> Self {
    Self::InvalidTransition { from: from.to_string(), to: to.to_string() }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
