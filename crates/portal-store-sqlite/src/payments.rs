//! Payment record queries and lifecycle transitions.
//!
//! Transitions run inside `BEGIN IMMEDIATE` transactions: the current state
//! is read, checked against the lifecycle, and written back under the same
//! write lock, so two concurrent approvals cannot both succeed.

use chrono::Utc;
use portal_core::{
  Error as CoreError,
  payment::{NewPayment, PaymentRecord, PaymentSearch, PaymentStatus, QuittanceId},
};
use rusqlite::{Connection, OptionalExtension as _, TransactionBehavior, params};
use uuid::Uuid;

use crate::{
  encode::{encode_amount, encode_dt, encode_uuid},
  error::{is_unique_violation, refuse},
  rows::{self, PAYMENT_COLUMNS},
};

/// Quittance numbers carry four random digits; on a per-tenant collision a
/// new one is drawn, up to this many times.
const QUITTANCE_ATTEMPTS: usize = 16;

pub fn insert(
  conn: &Connection,
  tenant_id: Uuid,
  input: NewPayment,
) -> tokio_rusqlite::Result<PaymentRecord> {
  let NewPayment { intent, memo_code } = input;
  let record = PaymentRecord {
    payment_id:       Uuid::new_v4(),
    tenant_id,
    email:            intent.email,
    amount:           intent.amount,
    currency:         intent.currency,
    method:           intent.method,
    payment_type:     intent.payment_type,
    reference_id:     intent.reference_id,
    memo_code,
    proof_url:        None,
    status:           PaymentStatus::PendingUpload,
    quittance_id:     None,
    verified_at:      None,
    verified_by:      None,
    admin_notes:      None,
    is_public_ledger: false,
    is_public:        false,
    created_at:       Utc::now(),
  };

  conn.execute(
    "INSERT INTO payment_records (
       payment_id, tenant_id, email, amount, currency, payment_method,
       payment_type, reference_id, memo_code, status, created_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
    params![
      encode_uuid(record.payment_id),
      encode_uuid(tenant_id),
      record.email,
      encode_amount(record.amount),
      record.currency.to_string(),
      record.method.to_string(),
      record.payment_type,
      record.reference_id,
      record.memo_code.as_str(),
      record.status.to_string(),
      encode_dt(record.created_at),
    ],
  )?;

  Ok(record)
}

pub fn get(
  conn: &Connection,
  tenant_id: Uuid,
  payment_id: Uuid,
) -> tokio_rusqlite::Result<Option<PaymentRecord>> {
  Ok(
    conn
      .query_row(
        &format!(
          "SELECT {PAYMENT_COLUMNS} FROM payment_records
           WHERE tenant_id = ?1 AND payment_id = ?2"
        ),
        params![encode_uuid(tenant_id), encode_uuid(payment_id)],
        rows::payment,
      )
      .optional()?,
  )
}

fn require(
  conn: &Connection,
  tenant_id: Uuid,
  payment_id: Uuid,
) -> tokio_rusqlite::Result<PaymentRecord> {
  get(conn, tenant_id, payment_id)?.ok_or_else(|| refuse(CoreError::RecordNotFound))
}

pub fn upload_proof(
  conn: &mut Connection,
  tenant_id: Uuid,
  payment_id: Uuid,
  proof_url: String,
) -> tokio_rusqlite::Result<PaymentRecord> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
  let current = require(&tx, tenant_id, payment_id)?;
  current
    .status
    .check_transition(PaymentStatus::PendingReview, payment_id)
    .map_err(refuse)?;

  tx.execute(
    "UPDATE payment_records SET proof_url = ?3, status = ?4
     WHERE tenant_id = ?1 AND payment_id = ?2",
    params![
      encode_uuid(tenant_id),
      encode_uuid(payment_id),
      proof_url,
      PaymentStatus::PendingReview.to_string(),
    ],
  )?;

  let updated = require(&tx, tenant_id, payment_id)?;
  tx.commit()?;
  Ok(updated)
}

pub fn search(
  conn: &Connection,
  tenant_id: Uuid,
  search: PaymentSearch,
) -> tokio_rusqlite::Result<Vec<PaymentRecord>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {PAYMENT_COLUMNS} FROM payment_records
     WHERE tenant_id = ?1 AND (email = ?2 OR memo_code = ?3)
     ORDER BY created_at DESC, rowid DESC"
  ))?;
  let rows = stmt
    .query_map(
      params![encode_uuid(tenant_id), search.email, search.memo.as_str()],
      rows::payment,
    )?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

pub fn list(
  conn: &Connection,
  tenant_id: Uuid,
  status: Option<PaymentStatus>,
) -> tokio_rusqlite::Result<Vec<PaymentRecord>> {
  let status = status.map(|s| s.to_string());
  let mut stmt = conn.prepare(&format!(
    "SELECT {PAYMENT_COLUMNS} FROM payment_records
     WHERE tenant_id = ?1 AND (?2 IS NULL OR status = ?2)
     ORDER BY created_at DESC, rowid DESC"
  ))?;
  let rows = stmt
    .query_map(
      params![encode_uuid(tenant_id), status],
      rows::payment,
    )?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

pub fn approve(
  conn: &mut Connection,
  tenant_id: Uuid,
  payment_id: Uuid,
  verified_by: Uuid,
) -> tokio_rusqlite::Result<PaymentRecord> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
  let current = require(&tx, tenant_id, payment_id)?;
  current
    .status
    .check_transition(PaymentStatus::Verified, payment_id)
    .map_err(refuse)?;

  let verified_at = Utc::now();
  let mut assigned = false;
  for _ in 0..QUITTANCE_ATTEMPTS {
    let quittance = QuittanceId::random(verified_at);
    let result = tx.execute(
      "UPDATE payment_records
       SET status = ?3, quittance_id = ?4, verified_at = ?5, verified_by = ?6
       WHERE tenant_id = ?1 AND payment_id = ?2 AND status = ?7",
      params![
        encode_uuid(tenant_id),
        encode_uuid(payment_id),
        PaymentStatus::Verified.to_string(),
        quittance.as_str(),
        encode_dt(verified_at),
        encode_uuid(verified_by),
        PaymentStatus::PendingReview.to_string(),
      ],
    );
    match result {
      Ok(_) => {
        assigned = true;
        break;
      }
      Err(e) if is_unique_violation(&e) => continue,
      Err(e) => return Err(e.into()),
    }
  }
  if !assigned {
    return Err(refuse(CoreError::Conflict(
      "no free quittance number for this year".to_owned(),
    )));
  }

  let updated = require(&tx, tenant_id, payment_id)?;
  tx.commit()?;
  Ok(updated)
}

pub fn reject(
  conn: &mut Connection,
  tenant_id: Uuid,
  payment_id: Uuid,
  reason: String,
) -> tokio_rusqlite::Result<PaymentRecord> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
  let current = require(&tx, tenant_id, payment_id)?;
  current
    .status
    .check_transition(PaymentStatus::Rejected, payment_id)
    .map_err(refuse)?;

  tx.execute(
    "UPDATE payment_records SET status = ?3, admin_notes = ?4
     WHERE tenant_id = ?1 AND payment_id = ?2",
    params![
      encode_uuid(tenant_id),
      encode_uuid(payment_id),
      PaymentStatus::Rejected.to_string(),
      reason,
    ],
  )?;

  let updated = require(&tx, tenant_id, payment_id)?;
  tx.commit()?;
  Ok(updated)
}
