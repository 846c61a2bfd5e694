//! Projects, audit publication and the public ledger.
//!
//! Publishing is one `BEGIN IMMEDIATE` transaction: the candidate payments
//! are selected, summed, flagged public and recorded in a snapshot together,
//! so a crash or a concurrent publish can neither double-count a payment nor
//! leave a snapshot without its flags.

use chrono::Utc;
use portal_core::{
  Amount, Error as CoreError,
  payment::PaymentStatus,
  project::{AuditSnapshot, LedgerEntry, NewProject, Project, PublicLedger, PublishOutcome},
};
use rusqlite::{Connection, OptionalExtension as _, TransactionBehavior, params};
use uuid::Uuid;

use crate::{
  encode::{encode_amount, encode_dt, encode_uuid},
  error::{on_unique, refuse},
  rows::{self, PAYMENT_COLUMNS, PROJECT_COLUMNS, SNAPSHOT_COLUMNS},
};

// ─── Projects ────────────────────────────────────────────────────────────────

pub fn create_project(
  conn: &Connection,
  tenant_id: Uuid,
  input: NewProject,
) -> tokio_rusqlite::Result<Project> {
  let input = input.validated().map_err(refuse)?;
  let project = Project {
    project_id:     Uuid::new_v4(),
    tenant_id,
    code:           input.code,
    title:          input.title,
    description:    input.description,
    target_amount:  input.target_amount,
    current_raised: Amount::ZERO,
    created_at:     Utc::now(),
  };

  conn
    .execute(
      "INSERT INTO projects (
         project_id, tenant_id, code, title, description,
         target_amount, current_raised, created_at
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
      params![
        encode_uuid(project.project_id),
        encode_uuid(tenant_id),
        project.code,
        project.title,
        project.description,
        encode_amount(project.target_amount),
        encode_amount(project.current_raised),
        encode_dt(project.created_at),
      ],
    )
    .map_err(on_unique("project code"))?;

  Ok(project)
}

pub fn get_project(
  conn: &Connection,
  tenant_id: Uuid,
  project_id: Uuid,
) -> tokio_rusqlite::Result<Option<Project>> {
  Ok(
    conn
      .query_row(
        &format!(
          "SELECT {PROJECT_COLUMNS} FROM projects
           WHERE tenant_id = ?1 AND project_id = ?2"
        ),
        params![encode_uuid(tenant_id), encode_uuid(project_id)],
        rows::project,
      )
      .optional()?,
  )
}

pub fn list_projects(conn: &Connection, tenant_id: Uuid) -> tokio_rusqlite::Result<Vec<Project>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {PROJECT_COLUMNS} FROM projects
     WHERE tenant_id = ?1
     ORDER BY created_at, rowid"
  ))?;
  let rows = stmt
    .query_map(params![encode_uuid(tenant_id)], rows::project)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

// ─── Publication ─────────────────────────────────────────────────────────────

pub fn publish(
  conn: &mut Connection,
  tenant_id: Uuid,
  project_id: Uuid,
) -> tokio_rusqlite::Result<PublishOutcome> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
  let project = get_project(&tx, tenant_id, project_id)?
    .ok_or_else(|| refuse(CoreError::RecordNotFound))?;

  // The substring prefilter only narrows the scan; the parsed memo reference decides.
  let candidates = {
    let mut stmt = tx.prepare(&format!(
      "SELECT {PAYMENT_COLUMNS} FROM payment_records
       WHERE tenant_id = ?1 AND status = ?2 AND is_public_ledger = 0
         AND instr(upper(memo_code), ?3) > 0
       ORDER BY created_at, rowid"
    ))?;
    stmt
      .query_map(
        params![
          encode_uuid(tenant_id),
          PaymentStatus::Verified.to_string(),
          project.code.to_ascii_uppercase(),
        ],
        rows::payment,
      )?
      .collect::<rusqlite::Result<Vec<_>>>()?
  };
  let matched: Vec<_> = candidates
    .into_iter()
    .filter(|p| p.memo_code.references(&project.code))
    .collect();

  if matched.is_empty() {
    tx.commit()?;
    return Ok(PublishOutcome::NothingToPublish {
      current_raised: project.current_raised,
    });
  }

  let overflow = || refuse(CoreError::Conflict("audit total overflows".to_owned()));
  let new_funds = Amount::checked_sum(matched.iter().map(|p| p.amount)).ok_or_else(overflow)?;
  let total = project
    .current_raised
    .checked_add(new_funds)
    .ok_or_else(overflow)?;

  tx.execute(
    "UPDATE projects SET current_raised = ?3 WHERE tenant_id = ?1 AND project_id = ?2",
    params![encode_uuid(tenant_id), encode_uuid(project_id), encode_amount(total)],
  )?;

  let payment_ids: Vec<Uuid> = matched.iter().map(|p| p.payment_id).collect();
  {
    let mut flag = tx.prepare(
      "UPDATE payment_records SET is_public_ledger = 1, is_public = 1
       WHERE tenant_id = ?1 AND payment_id = ?2",
    )?;
    for id in &payment_ids {
      flag.execute(params![encode_uuid(tenant_id), encode_uuid(*id)])?;
    }
  }

  let snapshot = AuditSnapshot {
    snapshot_id: Uuid::new_v4(),
    tenant_id,
    project_id,
    snapshot_total: total,
    new_funds_added: new_funds,
    payment_count: payment_ids.len() as u32,
    created_at: Utc::now(),
  };
  tx.execute(
    "INSERT INTO audit_snapshots (
       snapshot_id, tenant_id, project_id, snapshot_total,
       new_funds_added, payment_count, created_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    params![
      encode_uuid(snapshot.snapshot_id),
      encode_uuid(tenant_id),
      encode_uuid(project_id),
      encode_amount(snapshot.snapshot_total),
      encode_amount(snapshot.new_funds_added),
      snapshot.payment_count,
      encode_dt(snapshot.created_at),
    ],
  )?;

  tx.commit()?;
  Ok(PublishOutcome::Published { snapshot, payment_ids })
}

pub fn list_snapshots(
  conn: &Connection,
  tenant_id: Uuid,
  project_id: Uuid,
) -> tokio_rusqlite::Result<Vec<AuditSnapshot>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {SNAPSHOT_COLUMNS} FROM audit_snapshots
     WHERE tenant_id = ?1 AND project_id = ?2
     ORDER BY created_at, rowid"
  ))?;
  let rows = stmt
    .query_map(
      params![encode_uuid(tenant_id), encode_uuid(project_id)],
      rows::snapshot,
    )?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

// ─── Public ledger ───────────────────────────────────────────────────────────

pub fn public_ledger(conn: &Connection, tenant_id: Uuid) -> tokio_rusqlite::Result<PublicLedger> {
  let projects = list_projects(conn, tenant_id)?;

  let entries = {
    let mut stmt = conn.prepare(&format!(
      "SELECT {PAYMENT_COLUMNS} FROM payment_records
       WHERE tenant_id = ?1 AND is_public_ledger = 1
       ORDER BY verified_at DESC, rowid DESC"
    ))?;
    stmt
      .query_map(params![encode_uuid(tenant_id)], rows::payment)?
      .map(|r| r.map(LedgerEntry::from))
      .collect::<rusqlite::Result<Vec<_>>>()?
  };

  let latest_snapshot = conn
    .query_row(
      &format!(
        "SELECT {SNAPSHOT_COLUMNS} FROM audit_snapshots
         WHERE tenant_id = ?1
         ORDER BY created_at DESC, rowid DESC
         LIMIT 1"
      ),
      params![encode_uuid(tenant_id)],
      rows::snapshot,
    )
    .optional()?;

  Ok(PublicLedger { projects, entries, latest_snapshot })
}
