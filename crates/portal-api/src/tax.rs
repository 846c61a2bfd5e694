//! `POST /tax/lookup`: property-tax roll search.
//!
//! This endpoint keeps its own response shape: `{"results": [...]}` on
//! success and `{"error": "..."}` with status 400 for bad input.

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use portal_core::{
  store::PortalStore,
  tax::{TaxSearchKind, sample_record},
};
use serde::Deserialize;
use serde_json::json;

use crate::{ApiState, context::TenantContext, error::ApiError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupBody {
  pub search_type: Option<String>,
  pub query:       Option<String>,
}

fn bad_request(message: &str) -> Response {
  (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

/// `POST /tax/lookup`, body `{"searchType":"parcel"|"nif","query":"..."}`
pub async fn lookup<S>(
  State(state): State<ApiState<S>>,
  TenantContext(tenant): TenantContext,
  body: Result<Json<LookupBody>, JsonRejection>,
) -> Result<Response, ApiError>
where
  S: PortalStore + Clone + 'static,
{
  let Ok(Json(body)) = body else {
    return Ok(bad_request("Invalid request body"));
  };
  let (Some(kind), Some(query)) = (
    body.search_type.filter(|s| !s.trim().is_empty()),
    body.query.filter(|q| !q.trim().is_empty()),
  ) else {
    return Ok(bad_request("searchType and query are required"));
  };
  let Ok(kind) = kind.trim().to_ascii_lowercase().parse::<TaxSearchKind>() else {
    return Ok(bad_request("searchType must be \"parcel\" or \"nif\""));
  };

  let mut results = state
    .store
    .tax_lookup(tenant.tenant_id, kind, query.clone())
    .await
    .map_err(ApiError::store)?;
  if results.is_empty() && state.local_mode {
    results.push(sample_record(kind, query.trim()));
  }
  tracing::debug!(tenant = %tenant.subdomain, kind = %kind, hits = results.len(), "tax lookup");
  Ok(Json(json!({ "results": results })).into_response())
}
