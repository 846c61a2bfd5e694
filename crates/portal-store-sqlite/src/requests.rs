//! Service catalogue and idempotent service-request intake.

use chrono::Utc;
use portal_core::{
  Error as CoreError,
  request::{NewService, NewServiceRequest, RequestStatus, Service, ServiceRequest, Submission},
};
use rusqlite::{Connection, OptionalExtension as _, TransactionBehavior, params};
use uuid::Uuid;

use crate::{
  encode::{encode_dt, encode_uuid},
  error::{on_unique, refuse},
  rows::{self, REQUEST_COLUMNS, SERVICE_COLUMNS},
};

// ─── Services ────────────────────────────────────────────────────────────────

pub fn create_service(
  conn: &Connection,
  tenant_id: Uuid,
  input: NewService,
) -> tokio_rusqlite::Result<Service> {
  let code = input.service_code.trim().to_owned();
  if code.is_empty() {
    return Err(refuse(CoreError::validation("service_code", "must not be empty")));
  }
  let service = Service {
    service_id:   Uuid::new_v4(),
    tenant_id,
    service_code: code,
    service_name: input.service_name,
    description:  input.description,
    group:        input.group,
  };

  conn
    .execute(
      "INSERT INTO services (
         service_id, tenant_id, service_code, service_name, description, group_name
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
      params![
        encode_uuid(service.service_id),
        encode_uuid(tenant_id),
        service.service_code,
        service.service_name,
        service.description,
        service.group,
      ],
    )
    .map_err(on_unique("service code"))?;

  Ok(service)
}

pub fn list_services(conn: &Connection, tenant_id: Uuid) -> tokio_rusqlite::Result<Vec<Service>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {SERVICE_COLUMNS} FROM services
     WHERE tenant_id = ?1
     ORDER BY service_code"
  ))?;
  let rows = stmt
    .query_map(params![encode_uuid(tenant_id)], rows::service)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

fn service_exists(conn: &Connection, tenant_id: Uuid, code: &str) -> rusqlite::Result<bool> {
  conn
    .query_row(
      "SELECT 1 FROM services WHERE tenant_id = ?1 AND service_code = ?2",
      params![encode_uuid(tenant_id), code],
      |_| Ok(true),
    )
    .optional()
    .map(|found| found.unwrap_or(false))
}

// ─── Requests ────────────────────────────────────────────────────────────────

fn by_key(
  conn: &Connection,
  tenant_id: Uuid,
  key: &str,
) -> rusqlite::Result<Option<ServiceRequest>> {
  conn
    .query_row(
      &format!(
        "SELECT {REQUEST_COLUMNS} FROM service_requests
         WHERE tenant_id = ?1 AND idempotency_key = ?2"
      ),
      params![encode_uuid(tenant_id), key],
      rows::service_request,
    )
    .optional()
}

/// A replayed key returns the stored request untouched, even if the retried
/// body differs from the first one.
pub fn submit(
  conn: &mut Connection,
  tenant_id: Uuid,
  input: NewServiceRequest,
) -> tokio_rusqlite::Result<Submission> {
  let input = input.validated().map_err(refuse)?;
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

  if let Some(existing) = by_key(&tx, tenant_id, &input.idempotency_key)? {
    tx.commit()?;
    return Ok(Submission { request: existing, created: false });
  }

  if !service_exists(&tx, tenant_id, &input.service_code)? {
    return Err(refuse(CoreError::validation(
      "service_code",
      format!("unknown service {:?}", input.service_code),
    )));
  }

  let now = Utc::now();
  let request = ServiceRequest {
    request_id:      Uuid::new_v4(),
    tenant_id,
    service_code:    input.service_code,
    description:     input.description,
    location:        input.location,
    contact:         input.contact,
    status:          RequestStatus::Open,
    status_notes:    None,
    idempotency_key: input.idempotency_key,
    requested_at:    now,
    updated_at:      now,
  };

  tx.execute(
    "INSERT INTO service_requests (
       request_id, tenant_id, service_code, description, lat, long, address,
       email, first_name, last_name, phone, status, idempotency_key,
       requested_at, updated_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
    params![
      encode_uuid(request.request_id),
      encode_uuid(tenant_id),
      request.service_code,
      request.description,
      request.location.lat,
      request.location.long,
      request.location.address,
      request.contact.email,
      request.contact.first_name,
      request.contact.last_name,
      request.contact.phone,
      request.status.to_string(),
      request.idempotency_key,
      encode_dt(request.requested_at),
      encode_dt(request.updated_at),
    ],
  )?;

  tx.commit()?;
  Ok(Submission { request, created: true })
}

pub fn get(
  conn: &Connection,
  tenant_id: Uuid,
  request_id: Uuid,
) -> tokio_rusqlite::Result<Option<ServiceRequest>> {
  Ok(
    conn
      .query_row(
        &format!(
          "SELECT {REQUEST_COLUMNS} FROM service_requests
           WHERE tenant_id = ?1 AND request_id = ?2"
        ),
        params![encode_uuid(tenant_id), encode_uuid(request_id)],
        rows::service_request,
      )
      .optional()?,
  )
}

pub fn list(
  conn: &Connection,
  tenant_id: Uuid,
  status: Option<RequestStatus>,
) -> tokio_rusqlite::Result<Vec<ServiceRequest>> {
  let status = status.map(|s| s.to_string());
  let mut stmt = conn.prepare(&format!(
    "SELECT {REQUEST_COLUMNS} FROM service_requests
     WHERE tenant_id = ?1 AND (?2 IS NULL OR status = ?2)
     ORDER BY requested_at DESC, rowid DESC"
  ))?;
  let rows = stmt
    .query_map(params![encode_uuid(tenant_id), status], rows::service_request)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

pub fn update_status(
  conn: &mut Connection,
  tenant_id: Uuid,
  request_id: Uuid,
  status: RequestStatus,
  notes: Option<String>,
) -> tokio_rusqlite::Result<ServiceRequest> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
  let current = get(&tx, tenant_id, request_id)?
    .ok_or_else(|| refuse(CoreError::RecordNotFound))?;
  current.status.check_transition(status).map_err(refuse)?;

  tx.execute(
    "UPDATE service_requests
     SET status = ?3, status_notes = COALESCE(?4, status_notes), updated_at = ?5
     WHERE tenant_id = ?1 AND request_id = ?2",
    params![
      encode_uuid(tenant_id),
      encode_uuid(request_id),
      status.to_string(),
      notes,
      encode_dt(Utc::now()),
    ],
  )?;

  let updated = get(&tx, tenant_id, request_id)?
    .ok_or_else(|| refuse(CoreError::RecordNotFound))?;
  tx.commit()?;
  Ok(updated)
}
