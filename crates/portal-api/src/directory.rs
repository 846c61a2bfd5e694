//! Handlers for tenant reference data: profile, communal sections, officials,
//! facilities, the handbook and facility suggestions.
//!
//! Reads are public. Creates and reviews sit under `/admin`.

use axum::{
  Json,
  extract::{Path, Query, State},
};
use portal_core::{
  Error as CoreError,
  directory::{
    CommunalSection, Facility, FacilityFilter, FacilityStatus, FacilitySuggestion,
    HandbookArticle, NewCommunalSection, NewFacility, NewFacilitySuggestion, NewHandbookArticle,
    NewOfficial, Official, SuggestionDecision, SuggestionStatus,
  },
  store::PortalStore,
  tenant::Tenant,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  ApiState,
  context::{Authenticated, TenantContext},
  error::{ApiError, Success},
};

type Reply<T> = Result<Success<T>, ApiError>;

/// `GET /tenant`
pub async fn tenant_profile(TenantContext(tenant): TenantContext) -> Success<Tenant> {
  Success::ok(tenant)
}

// ─── Reads ───────────────────────────────────────────────────────────────────

/// `GET /directory/sections`
pub async fn sections<S>(
  State(state): State<ApiState<S>>,
  TenantContext(tenant): TenantContext,
) -> Reply<Vec<CommunalSection>>
where
  S: PortalStore + Clone + 'static,
{
  let rows = state
    .store
    .list_sections(tenant.tenant_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Success::ok(rows))
}

/// `GET /directory/officials`
pub async fn officials<S>(
  State(state): State<ApiState<S>>,
  TenantContext(tenant): TenantContext,
) -> Reply<Vec<Official>>
where
  S: PortalStore + Clone + 'static,
{
  let rows = state
    .store
    .list_officials(tenant.tenant_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Success::ok(rows))
}

/// `GET /directory/facilities[?status=&category=]`
pub async fn facilities<S>(
  State(state): State<ApiState<S>>,
  TenantContext(tenant): TenantContext,
  Query(filter): Query<FacilityFilter>,
) -> Reply<Vec<Facility>>
where
  S: PortalStore + Clone + 'static,
{
  let rows = state
    .store
    .list_facilities(tenant.tenant_id, filter)
    .await
    .map_err(ApiError::store)?;
  Ok(Success::ok(rows))
}

/// `GET /directory/handbook`
pub async fn handbook<S>(
  State(state): State<ApiState<S>>,
  TenantContext(tenant): TenantContext,
) -> Reply<Vec<HandbookArticle>>
where
  S: PortalStore + Clone + 'static,
{
  let rows = state
    .store
    .list_articles(tenant.tenant_id, false)
    .await
    .map_err(ApiError::store)?;
  Ok(Success::ok(rows))
}

/// `GET /directory/handbook/{slug}`
pub async fn article<S>(
  State(state): State<ApiState<S>>,
  TenantContext(tenant): TenantContext,
  Path(slug): Path<String>,
) -> Reply<HandbookArticle>
where
  S: PortalStore + Clone + 'static,
{
  let article = state
    .store
    .article_by_slug(tenant.tenant_id, slug)
    .await
    .map_err(ApiError::store)?
    .ok_or(CoreError::RecordNotFound)?;
  Ok(Success::ok(article))
}

// ─── Admin writes ────────────────────────────────────────────────────────────

/// `POST /admin/directory/sections`
pub async fn create_section<S>(
  State(state): State<ApiState<S>>,
  TenantContext(tenant): TenantContext,
  Authenticated(session): Authenticated,
  Json(body): Json<NewCommunalSection>,
) -> Reply<CommunalSection>
where
  S: PortalStore + Clone + 'static,
{
  session.require_admin(&tenant)?;
  let row = state
    .store
    .create_section(tenant.tenant_id, body)
    .await
    .map_err(ApiError::store)?;
  Ok(Success::created(row))
}

/// `POST /admin/directory/officials`
pub async fn create_official<S>(
  State(state): State<ApiState<S>>,
  TenantContext(tenant): TenantContext,
  Authenticated(session): Authenticated,
  Json(body): Json<NewOfficial>,
) -> Reply<Official>
where
  S: PortalStore + Clone + 'static,
{
  session.require_admin(&tenant)?;
  let row = state
    .store
    .create_official(tenant.tenant_id, body)
    .await
    .map_err(ApiError::store)?;
  Ok(Success::created(row))
}

/// `POST /admin/directory/facilities`
pub async fn create_facility<S>(
  State(state): State<ApiState<S>>,
  TenantContext(tenant): TenantContext,
  Authenticated(session): Authenticated,
  Json(body): Json<NewFacility>,
) -> Reply<Facility>
where
  S: PortalStore + Clone + 'static,
{
  session.require_admin(&tenant)?;
  let row = state
    .store
    .create_facility(tenant.tenant_id, body)
    .await
    .map_err(ApiError::store)?;
  Ok(Success::created(row))
}

#[derive(Debug, Deserialize)]
pub struct FacilityStatusBody {
  pub status: FacilityStatus,
}

/// `POST /admin/directory/facilities/{id}/status`
pub async fn set_facility_status<S>(
  State(state): State<ApiState<S>>,
  TenantContext(tenant): TenantContext,
  Authenticated(session): Authenticated,
  Path(id): Path<Uuid>,
  Json(body): Json<FacilityStatusBody>,
) -> Reply<Facility>
where
  S: PortalStore + Clone + 'static,
{
  session.require_staff(&tenant)?;
  let row = state
    .store
    .set_facility_status(tenant.tenant_id, id, body.status)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(facility = %id, status = %row.status, "facility status changed");
  Ok(Success::ok(row))
}

/// `POST /admin/directory/handbook`
pub async fn create_article<S>(
  State(state): State<ApiState<S>>,
  TenantContext(tenant): TenantContext,
  Authenticated(session): Authenticated,
  Json(body): Json<NewHandbookArticle>,
) -> Reply<HandbookArticle>
where
  S: PortalStore + Clone + 'static,
{
  session.require_admin(&tenant)?;
  let row = state
    .store
    .create_article(tenant.tenant_id, body)
    .await
    .map_err(ApiError::store)?;
  Ok(Success::created(row))
}

// ─── Suggestions ─────────────────────────────────────────────────────────────

/// `POST /suggestions`
pub async fn suggest<S>(
  State(state): State<ApiState<S>>,
  TenantContext(tenant): TenantContext,
  Json(body): Json<NewFacilitySuggestion>,
) -> Reply<FacilitySuggestion>
where
  S: PortalStore + Clone + 'static,
{
  let row = state
    .store
    .submit_suggestion(tenant.tenant_id, body)
    .await
    .map_err(ApiError::store)?;
  Ok(Success::created(row))
}

#[derive(Debug, Deserialize)]
pub struct SuggestionParams {
  pub status: Option<SuggestionStatus>,
}

/// `GET /admin/suggestions[?status=]`
pub async fn suggestions<S>(
  State(state): State<ApiState<S>>,
  TenantContext(tenant): TenantContext,
  Authenticated(session): Authenticated,
  Query(params): Query<SuggestionParams>,
) -> Reply<Vec<FacilitySuggestion>>
where
  S: PortalStore + Clone + 'static,
{
  session.require_staff(&tenant)?;
  let rows = state
    .store
    .list_suggestions(tenant.tenant_id, params.status)
    .await
    .map_err(ApiError::store)?;
  Ok(Success::ok(rows))
}

async fn review<S>(
  state: &ApiState<S>,
  tenant: &Tenant,
  id: Uuid,
  decision: SuggestionDecision,
) -> Reply<FacilitySuggestion>
where
  S: PortalStore + Clone + 'static,
{
  let row = state
    .store
    .review_suggestion(tenant.tenant_id, id, decision)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(suggestion = %id, decision = ?decision, "suggestion reviewed");
  Ok(Success::ok(row))
}

/// `POST /admin/suggestions/{id}/approve`
pub async fn approve_suggestion<S>(
  State(state): State<ApiState<S>>,
  TenantContext(tenant): TenantContext,
  Authenticated(session): Authenticated,
  Path(id): Path<Uuid>,
) -> Reply<FacilitySuggestion>
where
  S: PortalStore + Clone + 'static,
{
  session.require_admin(&tenant)?;
  review(&state, &tenant, id, SuggestionDecision::Approve).await
}

/// `POST /admin/suggestions/{id}/reject`
pub async fn reject_suggestion<S>(
  State(state): State<ApiState<S>>,
  TenantContext(tenant): TenantContext,
  Authenticated(session): Authenticated,
  Path(id): Path<Uuid>,
) -> Reply<FacilitySuggestion>
where
  S: PortalStore + Clone + 'static,
{
  session.require_admin(&tenant)?;
  review(&state, &tenant, id, SuggestionDecision::Reject).await
}
