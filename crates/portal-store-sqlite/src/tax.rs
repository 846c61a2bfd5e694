//! Property-tax roll.

use portal_core::{
  Error as CoreError,
  tax::{NewTaxRecord, TaxRecord, TaxSearchKind, normalize_nif},
};
use rusqlite::{Connection, params};
use uuid::Uuid;

use crate::{
  encode::{encode_amount, encode_uuid},
  error::refuse,
  rows::{self, TAX_COLUMNS},
};

pub fn add(conn: &Connection, tenant_id: Uuid, input: NewTaxRecord) -> tokio_rusqlite::Result<TaxRecord> {
  let parcel_number = input.parcel_number.trim().to_owned();
  let nif = input.nif.trim().to_owned();
  if parcel_number.is_empty() || normalize_nif(&nif).is_empty() {
    return Err(refuse(CoreError::validation("parcelNumber", "parcel number and NIF are required")));
  }
  let record = TaxRecord {
    record_id: Uuid::new_v4(),
    parcel_number,
    nif,
    owner_name: input.owner_name,
    address: input.address,
    assessed_value: input.assessed_value,
    amount_due: input.amount_due,
    fiscal_year: input.fiscal_year,
  };

  conn.execute(
    "INSERT INTO tax_records (
       record_id, tenant_id, parcel_number, nif, nif_normalized, owner_name,
       address, assessed_value, amount_due, fiscal_year
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
    params![
      encode_uuid(record.record_id),
      encode_uuid(tenant_id),
      record.parcel_number,
      record.nif,
      normalize_nif(&record.nif),
      record.owner_name,
      record.address,
      encode_amount(record.assessed_value),
      encode_amount(record.amount_due),
      record.fiscal_year,
    ],
  )?;

  Ok(record)
}

/// Parcels match case-insensitively; NIFs match ignoring separators.
pub fn lookup(
  conn: &Connection,
  tenant_id: Uuid,
  kind: TaxSearchKind,
  query: String,
) -> tokio_rusqlite::Result<Vec<TaxRecord>> {
  let (predicate, needle) = match kind {
    TaxSearchKind::Parcel => ("upper(parcel_number) = upper(?2)", query.trim().to_owned()),
    TaxSearchKind::Nif => ("nif_normalized = ?2", normalize_nif(&query)),
  };
  if needle.is_empty() {
    return Ok(Vec::new());
  }
  let mut stmt = conn.prepare(&format!(
    "SELECT {TAX_COLUMNS} FROM tax_records
     WHERE tenant_id = ?1 AND {predicate}
     ORDER BY fiscal_year DESC, parcel_number"
  ))?;
  let rows = stmt
    .query_map(params![encode_uuid(tenant_id), needle], rows::tax_record)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}
