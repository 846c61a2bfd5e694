//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings, UUIDs as hyphenated
//! lowercase strings, amounts as decimal text and enums as their snake_case
//! names. Decoding failures surface as
//! [`rusqlite::Error::FromSqlConversionFailure`] so row mappers stay plain
//! `rusqlite::Result` closures.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use portal_core::Amount;
use rusqlite::{Row, types::Type};
use uuid::Uuid;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

fn conversion(idx: usize, e: impl Into<BoxError>) -> rusqlite::Error {
  rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into())
}

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn get_uuid(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
  let s: String = row.get(idx)?;
  Uuid::parse_str(&s).map_err(|e| conversion(idx, e))
}

pub fn get_opt_uuid(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Uuid>> {
  let s: Option<String> = row.get(idx)?;
  s.map(|s| Uuid::parse_str(&s).map_err(|e| conversion(idx, e)))
    .transpose()
}

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

fn decode_dt(idx: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| conversion(idx, e))
}

pub fn get_dt(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
  let s: String = row.get(idx)?;
  decode_dt(idx, &s)
}

pub fn get_opt_dt(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
  let s: Option<String> = row.get(idx)?;
  s.map(|s| decode_dt(idx, &s)).transpose()
}

// ─── Amounts ─────────────────────────────────────────────────────────────────

pub fn encode_amount(a: Amount) -> String { a.to_string() }

pub fn get_amount(row: &Row<'_>, idx: usize) -> rusqlite::Result<Amount> { get_parsed(row, idx) }

// ─── Enums and other `FromStr` values ────────────────────────────────────────

/// Read a text column and parse it with `T::from_str`. Used for every
/// strum-derived status enum.
pub fn get_parsed<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
  T: FromStr,
  T::Err: std::error::Error + Send + Sync + 'static,
{
  let s: String = row.get(idx)?;
  s.parse().map_err(|e| conversion(idx, e))
}

// ─── Booleans ────────────────────────────────────────────────────────────────

pub fn get_bool(row: &Row<'_>, idx: usize) -> rusqlite::Result<bool> {
  let v: i64 = row.get(idx)?;
  Ok(v != 0)
}
