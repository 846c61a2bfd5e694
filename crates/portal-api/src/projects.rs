//! Handlers for projects, audit publication and the public ledger.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/projects` | Public list |
//! | `GET`  | `/projects/{id}/snapshots` | Audit trail, oldest first |
//! | `GET`  | `/ledger` | Transparency view; honours `If-None-Match` |
//! | `POST` | `/admin/projects` | Admin only |
//! | `POST` | `/admin/projects/{id}/publish[?code=]` | Admin only |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::{HeaderMap, HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use portal_core::{
  Error as CoreError,
  project::{AUDIT_VIEWS, AuditSnapshot, NewProject, Project, PublicLedger, PublishOutcome},
  store::PortalStore,
};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{
  ApiState,
  context::{Authenticated, TenantContext},
  error::{ApiError, Success},
};

// ─── Projects ────────────────────────────────────────────────────────────────

/// `GET /projects`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  TenantContext(tenant): TenantContext,
) -> Result<Success<Vec<Project>>, ApiError>
where
  S: PortalStore + Clone + 'static,
{
  let projects = state
    .store
    .list_projects(tenant.tenant_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Success::ok(projects))
}

/// `POST /admin/projects`
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  TenantContext(tenant): TenantContext,
  Authenticated(session): Authenticated,
  Json(body): Json<NewProject>,
) -> Result<Success<Project>, ApiError>
where
  S: PortalStore + Clone + 'static,
{
  session.require_admin(&tenant)?;
  let project = state
    .store
    .create_project(tenant.tenant_id, body)
    .await
    .map_err(ApiError::store)?;
  Ok(Success::created(project))
}

/// `GET /projects/{id}/snapshots`
pub async fn snapshots<S>(
  State(state): State<ApiState<S>>,
  TenantContext(tenant): TenantContext,
  Path(id): Path<Uuid>,
) -> Result<Success<Vec<AuditSnapshot>>, ApiError>
where
  S: PortalStore + Clone + 'static,
{
  state
    .store
    .get_project(tenant.tenant_id, id)
    .await
    .map_err(ApiError::store)?
    .ok_or(CoreError::RecordNotFound)?;
  let snapshots = state
    .store
    .list_snapshots(tenant.tenant_id, id)
    .await
    .map_err(ApiError::store)?;
  Ok(Success::ok(snapshots))
}

// ─── Publication ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PublishParams {
  /// When given, must equal the stored project code.
  pub code: Option<String>,
}

/// `POST /admin/projects/{id}/publish`
pub async fn publish<S>(
  State(state): State<ApiState<S>>,
  TenantContext(tenant): TenantContext,
  Authenticated(session): Authenticated,
  Path(id): Path<Uuid>,
  Query(params): Query<PublishParams>,
) -> Result<Success<PublishOutcome>, ApiError>
where
  S: PortalStore + Clone + 'static,
{
  session.require_admin(&tenant)?;
  if let Some(code) = params.code.as_deref() {
    let project = state
      .store
      .get_project(tenant.tenant_id, id)
      .await
      .map_err(ApiError::store)?
      .ok_or(CoreError::RecordNotFound)?;
    if !project.code.eq_ignore_ascii_case(code.trim()) {
      return Err(CoreError::RecordNotFound.into());
    }
  }

  let outcome = state
    .store
    .publish_audit(tenant.tenant_id, id)
    .await
    .map_err(ApiError::store)?;
  match &outcome {
    PublishOutcome::Published { snapshot, payment_ids } => {
      tracing::info!(
        tenant = %tenant.subdomain,
        project = %id,
        new_funds = %snapshot.new_funds_added,
        total = %snapshot.snapshot_total,
        payments = payment_ids.len(),
        "audit published"
      );
      tracing::info!(views = ?AUDIT_VIEWS, "cached views invalidated");
    }
    PublishOutcome::NothingToPublish { .. } => {
      tracing::info!(tenant = %tenant.subdomain, project = %id, "nothing to publish");
    }
  }
  Ok(Success::ok(outcome))
}

// ─── Ledger ──────────────────────────────────────────────────────────────────

/// Strong ETag over everything a publish can change: each project's total and
/// the latest snapshot.
pub fn ledger_etag(ledger: &PublicLedger) -> String {
  let mut projects: Vec<_> = ledger
    .projects
    .iter()
    .map(|p| (p.project_id, p.current_raised.cents()))
    .collect();
  projects.sort_by_key(|(id, _)| *id);

  let mut hasher = Sha256::new();
  for (id, cents) in &projects {
    hasher.update(id.as_bytes());
    hasher.update(cents.to_le_bytes());
  }
  if let Some(snapshot) = &ledger.latest_snapshot {
    hasher.update(snapshot.snapshot_id.as_bytes());
  }
  hasher.update((ledger.entries.len() as u64).to_le_bytes());
  format!("\"{}\"", hex::encode(hasher.finalize()))
}

fn etag_matches(headers: &HeaderMap, etag: &str) -> bool {
  headers
    .get(header::IF_NONE_MATCH)
    .and_then(|v| v.to_str().ok())
    .is_some_and(|v| {
      v.split(',')
        .map(str::trim)
        .any(|t| t == "*" || t == etag || t.trim_matches('"') == etag.trim_matches('"'))
    })
}

/// `GET /ledger`
pub async fn ledger<S>(
  State(state): State<ApiState<S>>,
  TenantContext(tenant): TenantContext,
  headers: HeaderMap,
) -> Result<Response, ApiError>
where
  S: PortalStore + Clone + 'static,
{
  let ledger = state
    .store
    .public_ledger(tenant.tenant_id)
    .await
    .map_err(ApiError::store)?;
  let etag = ledger_etag(&ledger);

  let mut resp = if etag_matches(&headers, &etag) {
    StatusCode::NOT_MODIFIED.into_response()
  } else {
    Success::ok(ledger).into_response()
  };
  if let Ok(value) = HeaderValue::from_str(&etag) {
    resp.headers_mut().insert(header::ETAG, value);
  }
  resp
    .headers_mut()
    .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
  Ok(resp)
}
