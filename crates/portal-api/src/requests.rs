//! Handlers for Open311-style services and service requests.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/services` | Public catalogue |
//! | `POST` | `/admin/services` | Admin only |
//! | `POST` | `/requests` | 201 on first submission, 200 on a replayed idempotency key |
//! | `GET`  | `/requests` | Staff only; optional `?status=` |
//! | `GET`  | `/requests/{id}` | 404 if missing or foreign |
//! | `POST` | `/admin/requests/{id}/status` | Staff only; body `{"status":"...","notes":"..."}` |

use axum::{
  Json,
  extract::{Path, Query, State},
};
use portal_core::{
  Error as CoreError,
  request::{NewService, NewServiceRequest, RequestStatus, Service, ServiceRequest},
  store::PortalStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  ApiState,
  context::{Authenticated, TenantContext},
  error::{ApiError, Success},
};

/// `GET /services`
pub async fn list_services<S>(
  State(state): State<ApiState<S>>,
  TenantContext(tenant): TenantContext,
) -> Result<Success<Vec<Service>>, ApiError>
where
  S: PortalStore + Clone + 'static,
{
  let services = state
    .store
    .list_services(tenant.tenant_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Success::ok(services))
}

/// `POST /admin/services`
pub async fn create_service<S>(
  State(state): State<ApiState<S>>,
  TenantContext(tenant): TenantContext,
  Authenticated(session): Authenticated,
  Json(body): Json<NewService>,
) -> Result<Success<Service>, ApiError>
where
  S: PortalStore + Clone + 'static,
{
  session.require_admin(&tenant)?;
  let service = state
    .store
    .create_service(tenant.tenant_id, body)
    .await
    .map_err(ApiError::store)?;
  Ok(Success::created(service))
}

/// `POST /requests`
pub async fn submit<S>(
  State(state): State<ApiState<S>>,
  TenantContext(tenant): TenantContext,
  Json(body): Json<NewServiceRequest>,
) -> Result<Success<ServiceRequest>, ApiError>
where
  S: PortalStore + Clone + 'static,
{
  let submission = state
    .store
    .submit_service_request(tenant.tenant_id, body)
    .await
    .map_err(ApiError::store)?;
  let request = submission.request;
  if submission.created {
    tracing::info!(
      tenant = %tenant.subdomain,
      request = %request.request_id,
      service = %request.service_code,
      "service request submitted"
    );
    Ok(Success::created(request))
  } else {
    tracing::debug!(request = %request.request_id, "idempotent replay");
    Ok(Success::ok(request))
  }
}

/// `GET /requests/{id}`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  TenantContext(tenant): TenantContext,
  Path(id): Path<Uuid>,
) -> Result<Success<ServiceRequest>, ApiError>
where
  S: PortalStore + Clone + 'static,
{
  let request = state
    .store
    .get_service_request(tenant.tenant_id, id)
    .await
    .map_err(ApiError::store)?
    .ok_or(CoreError::RecordNotFound)?;
  Ok(Success::ok(request))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub status: Option<RequestStatus>,
}

/// `GET /requests[?status=<status>]`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  TenantContext(tenant): TenantContext,
  Authenticated(session): Authenticated,
  Query(params): Query<ListParams>,
) -> Result<Success<Vec<ServiceRequest>>, ApiError>
where
  S: PortalStore + Clone + 'static,
{
  session.require_staff(&tenant)?;
  let requests = state
    .store
    .list_service_requests(tenant.tenant_id, params.status)
    .await
    .map_err(ApiError::store)?;
  Ok(Success::ok(requests))
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub status: RequestStatus,
  pub notes:  Option<String>,
}

/// `POST /admin/requests/{id}/status`
pub async fn update_status<S>(
  State(state): State<ApiState<S>>,
  TenantContext(tenant): TenantContext,
  Authenticated(session): Authenticated,
  Path(id): Path<Uuid>,
  Json(body): Json<StatusBody>,
) -> Result<Success<ServiceRequest>, ApiError>
where
  S: PortalStore + Clone + 'static,
{
  session.require_staff(&tenant)?;
  let request = state
    .store
    .update_service_request_status(tenant.tenant_id, id, body.status, body.notes)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(request = %id, status = %request.status, "service request updated");
  Ok(Success::ok(request))
}
