//! Public events and emergency alerts.

use chrono::{DateTime, Utc};
use portal_core::alert::{Event, NewEvent, Severity};
use rusqlite::{Connection, params};
use uuid::Uuid;

use crate::{
  encode::{encode_dt, encode_uuid},
  error::refuse,
  rows::{self, EVENT_COLUMNS},
};

pub fn create(conn: &Connection, tenant_id: Uuid, input: NewEvent) -> tokio_rusqlite::Result<Event> {
  let input = input.validated().map_err(refuse)?;
  let event = Event {
    event_id: Uuid::new_v4(),
    tenant_id,
    title: input.title,
    body: input.body,
    severity: input.severity,
    starts_at: input.starts_at.unwrap_or_else(Utc::now),
    ends_at: input.ends_at,
  };

  conn.execute(
    "INSERT INTO events (event_id, tenant_id, title, body, severity, starts_at, ends_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    params![
      encode_uuid(event.event_id),
      encode_uuid(tenant_id),
      event.title,
      event.body,
      event.severity.to_string(),
      encode_dt(event.starts_at),
      event.ends_at.map(encode_dt),
    ],
  )?;

  Ok(event)
}

/// Timestamps are compared after decoding rather than as text, since stored
/// offsets may differ.
pub fn active_alert(
  conn: &Connection,
  tenant_id: Uuid,
  now: DateTime<Utc>,
) -> tokio_rusqlite::Result<Option<Event>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {EVENT_COLUMNS} FROM events
     WHERE tenant_id = ?1 AND severity = ?2"
  ))?;
  let events = stmt
    .query_map(
      params![encode_uuid(tenant_id), Severity::Emergency.to_string()],
      rows::event,
    )?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(
    events
      .into_iter()
      .filter(|e| e.is_active_alert(now))
      .max_by_key(|e| e.starts_at),
  )
}
