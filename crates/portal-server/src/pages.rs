//! Fallback for page paths.
//!
//! Page rendering lives elsewhere; this only guarantees that a request for an
//! unknown tenant gets a readable 404 instead of an error.

use axum::{
  extract::State,
  http::{HeaderMap, StatusCode},
  response::{Html, IntoResponse, Response},
};
use portal_core::{store::PortalStore, tenant::TENANT_HEADER};

use crate::AppState;

const TENANT_NOT_FOUND: &str = r#"<!doctype html>
<html lang="fr">
<head><meta charset="utf-8"><title>Tenant not found</title></head>
<body style="display:flex;min-height:100vh;align-items:center;justify-content:center;margin:0;font-family:sans-serif">
<h1>Tenant not found</h1>
</body>
</html>
"#;

pub fn tenant_not_found() -> Response {
  (StatusCode::NOT_FOUND, Html(TENANT_NOT_FOUND)).into_response()
}

pub async fn fallback<S>(State(state): State<AppState<S>>, headers: HeaderMap) -> Response
where
  S: PortalStore + Clone + 'static,
{
  let subdomain = headers
    .get(TENANT_HEADER)
    .and_then(|v| v.to_str().ok())
    .unwrap_or_default()
    .to_owned();

  match state.store.tenant_by_subdomain(subdomain.clone()).await {
    Ok(Some(_)) => StatusCode::NOT_FOUND.into_response(),
    Ok(None) => {
      tracing::info!(subdomain = %subdomain, "page requested for unknown tenant");
      tenant_not_found()
    }
    Err(e) => {
      tracing::error!(error = %e, "tenant lookup failed");
      StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
  }
}
