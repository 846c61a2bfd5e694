//! Handlers for payment endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/payments` | Body: a payment intent; returns the record with its memo code |
//! | `POST` | `/payments/{id}/proof` | Body: `{"proof_url":"..."}` |
//! | `GET`  | `/payments/{id}` | 404 if missing or foreign |
//! | `GET`  | `/payments/search?q=` | Exact email or memo code |
//! | `GET`  | `/admin/payments?status=` | Staff review queue |
//! | `POST` | `/admin/payments/{id}/approve` | Admin only |
//! | `POST` | `/admin/payments/{id}/reject` | Admin only; body `{"reason":"..."}` |

use axum::{
  Json,
  extract::{Path, Query, State},
};
use portal_core::{
  Error as CoreError,
  payment::{MemoCode, NewPayment, PaymentIntent, PaymentRecord, PaymentSearch, PaymentStatus},
  store::PortalStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  ApiState,
  context::{Authenticated, TenantContext},
  error::{ApiError, Success},
};

type Reply<T> = Result<Success<T>, ApiError>;

// ─── Citizen flow ────────────────────────────────────────────────────────────

/// `POST /payments`
pub async fn create_intent<S>(
  State(state): State<ApiState<S>>,
  TenantContext(tenant): TenantContext,
  Json(intent): Json<PaymentIntent>,
) -> Reply<PaymentRecord>
where
  S: PortalStore + Clone + 'static,
{
  let intent = intent.validated()?;
  let memo_code = MemoCode::generate(
    &tenant.subdomain,
    &intent.payment_type,
    intent.reference_id.as_deref(),
  );
  let record = state
    .store
    .create_payment(tenant.tenant_id, NewPayment { intent, memo_code })
    .await
    .map_err(ApiError::store)?;
  tracing::info!(
    tenant = %tenant.subdomain,
    payment = %record.payment_id,
    memo = %record.memo_code,
    "payment intent created"
  );
  Ok(Success::created(record))
}

#[derive(Debug, Deserialize)]
pub struct ProofBody {
  #[serde(alias = "proofUrl")]
  pub proof_url: String,
}

/// `POST /payments/{id}/proof`
pub async fn upload_proof<S>(
  State(state): State<ApiState<S>>,
  TenantContext(tenant): TenantContext,
  Path(id): Path<Uuid>,
  Json(body): Json<ProofBody>,
) -> Reply<PaymentRecord>
where
  S: PortalStore + Clone + 'static,
{
  let proof_url = body.proof_url.trim().to_owned();
  if proof_url.is_empty() {
    return Err(CoreError::validation("proof_url", "must not be empty").into());
  }
  let record = state
    .store
    .upload_proof(tenant.tenant_id, id, proof_url)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(tenant = %tenant.subdomain, payment = %id, "proof uploaded");
  Ok(Success::ok(record))
}

/// `GET /payments/{id}`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  TenantContext(tenant): TenantContext,
  Path(id): Path<Uuid>,
) -> Reply<PaymentRecord>
where
  S: PortalStore + Clone + 'static,
{
  let record = state
    .store
    .get_payment(tenant.tenant_id, id)
    .await
    .map_err(ApiError::store)?
    .ok_or(CoreError::RecordNotFound)?;
  Ok(Success::ok(record))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
  #[serde(default)]
  pub q: String,
}

/// `GET /payments/search?q=`
pub async fn search<S>(
  State(state): State<ApiState<S>>,
  TenantContext(tenant): TenantContext,
  Query(params): Query<SearchParams>,
) -> Reply<Vec<PaymentRecord>>
where
  S: PortalStore + Clone + 'static,
{
  let search = PaymentSearch::new(&params.q)
    .ok_or_else(|| ApiError::BadRequest("a search query is required".to_owned()))?;
  let records = state
    .store
    .search_payments(tenant.tenant_id, search)
    .await
    .map_err(ApiError::store)?;
  Ok(Success::ok(records))
}

// ─── Review ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub status: Option<PaymentStatus>,
}

/// `GET /admin/payments[?status=<status>]`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  TenantContext(tenant): TenantContext,
  Authenticated(session): Authenticated,
  Query(params): Query<ListParams>,
) -> Reply<Vec<PaymentRecord>>
where
  S: PortalStore + Clone + 'static,
{
  session.require_staff(&tenant)?;
  let records = state
    .store
    .list_payments(tenant.tenant_id, params.status)
    .await
    .map_err(ApiError::store)?;
  Ok(Success::ok(records))
}

/// `POST /admin/payments/{id}/approve`
pub async fn approve<S>(
  State(state): State<ApiState<S>>,
  TenantContext(tenant): TenantContext,
  Authenticated(session): Authenticated,
  Path(id): Path<Uuid>,
) -> Reply<PaymentRecord>
where
  S: PortalStore + Clone + 'static,
{
  session.require_admin(&tenant)?;
  let record = state
    .store
    .approve_payment(tenant.tenant_id, id, session.id)
    .await
    .map_err(ApiError::store)
    .inspect_err(|e| tracing::warn!(payment = %id, error = %e, "approval refused"))?;
  tracing::info!(
    tenant = %tenant.subdomain,
    payment = %id,
    quittance = ?record.quittance_id.as_ref().map(|q| q.as_str()),
    admin = %session.id,
    "payment verified"
  );
  Ok(Success::ok(record))
}

#[derive(Debug, Deserialize)]
pub struct RejectBody {
  pub reason: String,
}

/// `POST /admin/payments/{id}/reject`
pub async fn reject<S>(
  State(state): State<ApiState<S>>,
  TenantContext(tenant): TenantContext,
  Authenticated(session): Authenticated,
  Path(id): Path<Uuid>,
  Json(body): Json<RejectBody>,
) -> Reply<PaymentRecord>
where
  S: PortalStore + Clone + 'static,
{
  session.require_admin(&tenant)?;
  let reason = body.reason.trim().to_owned();
  if reason.is_empty() {
    return Err(CoreError::validation("reason", "must not be empty").into());
  }
  let record = state
    .store
    .reject_payment(tenant.tenant_id, id, reason)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(tenant = %tenant.subdomain, payment = %id, admin = %session.id, "payment rejected");
  Ok(Success::ok(record))
}
