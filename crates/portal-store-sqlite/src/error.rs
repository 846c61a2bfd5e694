//! Error type for `portal-store-sqlite`.

use portal_core::store::DomainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] portal_core::Error),

  #[error("database error: {0}")]
  Database(tokio_rusqlite::Error),

  #[error("unsupported database url: {0:?}")]
  DatabaseUrl(String),
}

/// Domain refusals raised inside a `call` closure travel as
/// `tokio_rusqlite::Error::Other` and are unwrapped here.
impl From<tokio_rusqlite::Error> for Error {
  fn from(e: tokio_rusqlite::Error) -> Self {
    match e {
      tokio_rusqlite::Error::Other(boxed) => match boxed.downcast::<portal_core::Error>() {
        Ok(core) => Error::Core(*core),
        Err(other) => Error::Database(tokio_rusqlite::Error::Other(other)),
      },
      other => Error::Database(other),
    }
  }
}

impl DomainError for Error {
  fn domain(&self) -> Option<&portal_core::Error> {
    match self {
      Error::Core(e) => Some(e),
      _ => None,
    }
  }
}

/// Wrap a domain refusal so it can leave a `call` closure.
pub(crate) fn refuse(e: portal_core::Error) -> tokio_rusqlite::Error {
  tokio_rusqlite::Error::Other(Box::new(e))
}

/// Translate a uniqueness violation on insert into a domain `Conflict`.
pub(crate) fn on_unique(what: &str) -> impl FnOnce(rusqlite::Error) -> tokio_rusqlite::Error + '_ {
  move |e| {
    if is_unique_violation(&e) {
      refuse(portal_core::Error::Conflict(format!("{what} already exists")))
    } else {
      e.into()
    }
  }
}

pub(crate) fn is_unique_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(f, _)
      if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        || f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
  )
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
