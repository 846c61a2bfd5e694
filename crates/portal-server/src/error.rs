//! Startup errors: configuration that cannot be served.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("configuration error: {0}")]
  Config(#[from] config::ConfigError),
  #[error("DATABASE_URL is not set")]
  MissingDatabaseUrl,
  #[error("AUTH_SECRET is not set")]
  MissingSecret,
  #[error("AUTH_SECRET must be at least {min} bytes, got {len}")]
  WeakSecret { len: usize, min: usize },
}
