//! Tenant-resolution middleware.
//!
//! Runs on every request: derives the subdomain from `Host` and writes it to
//! `x-tenant-subdomain`, replacing whatever the client sent, so handlers
//! downstream read the header instead of parsing the host again.

use axum::{
  extract::Request,
  http::{HeaderValue, header},
  middleware::Next,
  response::Response,
};
use portal_core::tenant::{TENANT_HEADER, resolve_subdomain};

fn host_of(req: &Request) -> String {
  req
    .headers()
    .get(header::HOST)
    .and_then(|v| v.to_str().ok())
    .or_else(|| req.uri().authority().map(|a| a.as_str()))
    .unwrap_or_default()
    .to_owned()
}

pub async fn resolve_tenant(mut req: Request, next: Next) -> Response {
  let host = host_of(&req);
  let subdomain = resolve_subdomain(&host);
  tracing::debug!(host = %host, subdomain = %subdomain, path = %req.uri().path(), "tenant resolved");

  match HeaderValue::from_str(&subdomain) {
    Ok(value) => {
      req.headers_mut().insert(TENANT_HEADER, value);
    }
    Err(_) => {
      req.headers_mut().remove(TENANT_HEADER);
    }
  }
  next.run(req).await
}
