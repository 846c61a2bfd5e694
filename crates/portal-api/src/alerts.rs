//! Emergency alerts.
//!
//! Clients poll `GET /alerts/active` every minute; the response is cacheable
//! for that long.

use axum::{
  Json,
  extract::State,
  http::{HeaderValue, header},
  response::{IntoResponse, Response},
};
use chrono::Utc;
use portal_core::{
  alert::{Event, NewEvent},
  store::PortalStore,
};

use crate::{
  ApiState,
  context::{Authenticated, TenantContext},
  error::{ApiError, Success},
};

/// `GET /alerts/active`
pub async fn active<S>(
  State(state): State<ApiState<S>>,
  TenantContext(tenant): TenantContext,
) -> Result<Response, ApiError>
where
  S: PortalStore + Clone + 'static,
{
  let alert = state
    .store
    .active_alert(tenant.tenant_id, Utc::now())
    .await
    .map_err(ApiError::store)?;
  let mut resp = Success::ok(alert).into_response();
  resp
    .headers_mut()
    .insert(header::CACHE_CONTROL, HeaderValue::from_static("public, max-age=60"));
  Ok(resp)
}

/// `POST /admin/alerts`
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  TenantContext(tenant): TenantContext,
  Authenticated(session): Authenticated,
  Json(body): Json<NewEvent>,
) -> Result<Success<Event>, ApiError>
where
  S: PortalStore + Clone + 'static,
{
  session.require_staff(&tenant)?;
  let event = state
    .store
    .create_event(tenant.tenant_id, body)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(
    tenant = %tenant.subdomain,
    event = %event.event_id,
    severity = %event.severity,
    "event published"
  );
  Ok(Success::created(event))
}
